//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.
//! Protected handlers receive the caller's [`crate::domain::entities::OwnerId`]
//! from the auth middleware.

pub mod allergens;
pub mod formulas;
pub mod health;
pub mod ingredients;

pub use allergens::{
    allergen_list_handler, create_allergen_handler, delete_allergen_handler,
    get_allergen_handler, update_allergen_handler,
};
pub use formulas::{
    create_formula_handler, delete_formula_handler, delete_formula_ingredient_handler,
    formula_allergens_handler, formula_ingredients_handler, formula_list_handler,
    get_formula_handler, preview_allergens_handler, sync_composition_handler,
    update_formula_handler, upsert_formula_ingredient_handler,
};
pub use health::health_handler;
pub use ingredients::{
    create_ingredient_handler, delete_ingredient_allergen_handler, delete_ingredient_handler,
    get_ingredient_handler, ingredient_allergens_handler, ingredient_list_handler,
    update_ingredient_handler, upsert_ingredient_allergen_handler,
};
