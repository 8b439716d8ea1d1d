//! Formula detail page: composition and allergen exposure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::domain::entities::OwnerId;
use crate::domain::percent::{DISPLAY_DECIMALS, format_percent_display};
use crate::error::AppError;
use crate::state::AppState;

pub struct IngredientRow {
    pub name: String,
    pub parts: f64,
    pub share: String,
}

pub struct ExposureRow {
    pub name: String,
    pub total: String,
    pub limit: String,
    pub exceeds: bool,
}

/// Renders `templates/formula.html`.
#[derive(Template, WebTemplate)]
#[template(path = "formula.html")]
pub struct FormulaTemplate {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<IngredientRow>,
    pub allergens: Vec<ExposureRow>,
    pub total: String,
    pub flagged: usize,
}

/// Renders a formula's composition with each ingredient's share of the
/// total and the allergen exposure table. Allergens above their ceiling
/// are flagged.
///
/// # Endpoint
///
/// `GET /dashboard/formulas/{id}`
///
/// # Errors
///
/// Returns 404 if the formula does not exist.
pub async fn formula_page_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<impl IntoResponse, AppError> {
    let exposure = state
        .composition_service
        .formula_exposure(&owner, id)
        .await?;

    let ingredients = exposure
        .ingredients
        .into_iter()
        .map(|i| IngredientRow {
            name: i.ingredient_name,
            parts: i.parts,
            share: format_percent_display(i.share, DISPLAY_DECIMALS),
        })
        .collect();

    let allergens: Vec<ExposureRow> = exposure
        .report
        .allergens
        .into_iter()
        .map(|a| ExposureRow {
            name: a.name,
            total: format_percent_display(a.total, DISPLAY_DECIMALS),
            limit: format_percent_display(a.max_concentration, DISPLAY_DECIMALS),
            exceeds: a.exceeds_limit,
        })
        .collect();

    let flagged = allergens.iter().filter(|a| a.exceeds).count();

    Ok(FormulaTemplate {
        id: exposure.formula.id,
        name: exposure.formula.name,
        ingredients,
        allergens,
        total: format_percent_display(exposure.report.total_exposure, DISPLAY_DECIMALS),
        flagged,
    })
}
