//! Link rows between ingredients, allergens and formulas.

/// Allergen to attach to an ingredient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllergenLinkInput {
    pub allergen_id: i64,
    /// Fraction of the ingredient's mass that is this allergen.
    pub concentration: f64,
}

/// An ingredient-allergen link as read for overviews.
///
/// The allergen name is optional because the overview query joins loosely.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientAllergenRow {
    pub ingredient_id: i64,
    pub allergen_id: i64,
    pub allergen_name: Option<String>,
    pub concentration: f64,
}

/// One line of a saved formula, joined with the ingredient name.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaIngredient {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub parts: f64,
}
