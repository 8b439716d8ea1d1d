//! Per-ingredient allergen overview used by the ingredient list.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::entities::{Ingredient, IngredientAllergenRow};

/// How many allergens an ingredient list entry shows.
pub const TOP_ALLERGENS: usize = 3;

/// Shown when a link points at an allergen without a name.
const UNKNOWN_ALLERGEN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct TopAllergen {
    pub id: i64,
    pub name: String,
    pub concentration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientSummary {
    pub id: i64,
    pub name: String,
    pub top_allergens: Vec<TopAllergen>,
    pub allergen_count: usize,
}

/// Builds one summary per ingredient, in input order.
///
/// `top_allergens` holds at most [`TOP_ALLERGENS`] entries ordered by
/// concentration, highest first. Links to ingredients that are not in
/// `ingredients` are ignored.
pub fn summarize_ingredients(
    ingredients: Vec<Ingredient>,
    links: Vec<IngredientAllergenRow>,
) -> Vec<IngredientSummary> {
    let mut by_ingredient: HashMap<i64, Vec<IngredientAllergenRow>> = HashMap::new();
    for link in links {
        by_ingredient.entry(link.ingredient_id).or_default().push(link);
    }

    ingredients
        .into_iter()
        .map(|ingredient| {
            let mut links = by_ingredient.remove(&ingredient.id).unwrap_or_default();
            let allergen_count = links.len();

            links.sort_by(|a, b| {
                b.concentration
                    .partial_cmp(&a.concentration)
                    .unwrap_or(Ordering::Equal)
            });

            let top_allergens = links
                .into_iter()
                .take(TOP_ALLERGENS)
                .map(|l| TopAllergen {
                    id: l.allergen_id,
                    name: l
                        .allergen_name
                        .unwrap_or_else(|| UNKNOWN_ALLERGEN.to_string()),
                    concentration: l.concentration,
                })
                .collect();

            IngredientSummary {
                id: ingredient.id,
                name: ingredient.name,
                top_allergens,
                allergen_count,
            }
        })
        .collect()
}
