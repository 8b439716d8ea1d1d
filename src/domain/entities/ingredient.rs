//! Domain entity representing a formulation ingredient.

use chrono::{DateTime, Utc};

use super::links::AllergenLinkInput;

/// A raw material usable in formulas, itself composed of allergens at
/// known concentrations.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Creates a new Ingredient instance.
    pub fn new(
        id: i64,
        name: String,
        owner_id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            owner_id,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating an ingredient.
///
/// `allergens` is the initial allergen profile; it is stored in the same
/// transaction as the ingredient.
#[derive(Debug, Clone, Default)]
pub struct NewIngredient {
    pub name: String,
    pub allergens: Vec<AllergenLinkInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_creation() {
        let now = Utc::now();
        let ingredient = Ingredient::new(1, "Bergamot".to_string(), "public".to_string(), now, now);

        assert_eq!(ingredient.id, 1);
        assert_eq!(ingredient.name, "Bergamot");
        assert_eq!(ingredient.owner_id, "public");
    }

    #[test]
    fn test_new_ingredient_default_has_no_allergens() {
        let new_ingredient = NewIngredient {
            name: "Vanillin".to_string(),
            ..Default::default()
        };

        assert!(new_ingredient.allergens.is_empty());
    }
}
