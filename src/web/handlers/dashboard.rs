//! Dashboard home page: the owner's formulas.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::api::dto::search::SearchParams;
use crate::domain::entities::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FormulaRow {
    pub id: i64,
    pub name: String,
    pub updated: String,
}

/// Renders `templates/dashboard.html`.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub query: String,
    pub formulas: Vec<FormulaRow>,
}

/// Renders the formula list, filtered by name.
///
/// # Endpoint
///
/// `GET /dashboard/?q=<text>`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let formulas = state.formula_service.list_formulas(&owner).await?;

    let rows = formulas
        .into_iter()
        .map(|f| FormulaRow {
            id: f.id,
            name: f.name,
            updated: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    Ok(DashboardTemplate {
        query: params.q.clone().unwrap_or_default(),
        formulas: params.apply(rows),
    })
}
