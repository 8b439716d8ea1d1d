//! Web dashboard route configuration.

use crate::state::AppState;
use crate::web::handlers::{dashboard_handler, formula_page_handler, login_handler};
use axum::{Router, routing::get};

/// Protected dashboard routes requiring authentication.
///
/// Protected via [`crate::web::middleware::web_auth`].
///
/// # Endpoints
///
/// - `GET /` - Formula list with a search box
/// - `GET /formulas/{id}` - Composition and allergen exposure of one formula
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/formulas/{id}", get(formula_page_handler))
}

/// Public dashboard routes without authentication.
///
/// # Endpoints
///
/// - `GET /login` - Login page
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/login", get(login_handler))
}
