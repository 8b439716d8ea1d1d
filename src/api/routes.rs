//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    allergen_list_handler, create_allergen_handler, create_formula_handler,
    create_ingredient_handler, delete_allergen_handler, delete_formula_handler,
    delete_formula_ingredient_handler, delete_ingredient_allergen_handler,
    delete_ingredient_handler, formula_allergens_handler, formula_ingredients_handler,
    formula_list_handler, get_allergen_handler, get_formula_handler, get_ingredient_handler,
    ingredient_allergens_handler, ingredient_list_handler, preview_allergens_handler,
    sync_composition_handler, update_allergen_handler, update_formula_handler,
    update_ingredient_handler, upsert_formula_ingredient_handler,
    upsert_ingredient_allergen_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET|POST          /ingredients`
/// - `GET|PATCH|DELETE  /ingredients/{id}`
/// - `GET|POST          /ingredients/{id}/allergens`
/// - `DELETE            /ingredients/{id}/allergens/{allergen_id}`
/// - `GET|POST          /allergens`
/// - `GET|PATCH|DELETE  /allergens/{id}`
/// - `GET|POST          /formulas`
/// - `GET|PATCH|DELETE  /formulas/{id}`
/// - `GET|POST          /formulas/{id}/ingredients`
/// - `DELETE            /formulas/{id}/ingredients/{ingredient_id}`
/// - `GET               /formulas/{id}/allergens`         - exposure of the saved composition
/// - `POST              /formulas/{id}/allergens/preview` - exposure of a draft
/// - `PUT               /formulas/{id}/composition`       - save a draft
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/ingredients",
            get(ingredient_list_handler).post(create_ingredient_handler),
        )
        .route(
            "/ingredients/{id}",
            get(get_ingredient_handler)
                .patch(update_ingredient_handler)
                .delete(delete_ingredient_handler),
        )
        .route(
            "/ingredients/{id}/allergens",
            get(ingredient_allergens_handler).post(upsert_ingredient_allergen_handler),
        )
        .route(
            "/ingredients/{id}/allergens/{allergen_id}",
            delete(delete_ingredient_allergen_handler),
        )
        .route(
            "/allergens",
            get(allergen_list_handler).post(create_allergen_handler),
        )
        .route(
            "/allergens/{id}",
            get(get_allergen_handler)
                .patch(update_allergen_handler)
                .delete(delete_allergen_handler),
        )
        .route(
            "/formulas",
            get(formula_list_handler).post(create_formula_handler),
        )
        .route(
            "/formulas/{id}",
            get(get_formula_handler)
                .patch(update_formula_handler)
                .delete(delete_formula_handler),
        )
        .route(
            "/formulas/{id}/ingredients",
            get(formula_ingredients_handler).post(upsert_formula_ingredient_handler),
        )
        .route(
            "/formulas/{id}/ingredients/{ingredient_id}",
            delete(delete_formula_ingredient_handler),
        )
        .route("/formulas/{id}/allergens", get(formula_allergens_handler))
        .route(
            "/formulas/{id}/allergens/preview",
            post(preview_allergens_handler),
        )
        .route("/formulas/{id}/composition", put(sync_composition_handler))
}
