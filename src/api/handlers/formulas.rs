//! Handlers for formula endpoints: CRUD, composition editing and allergen
//! exposure.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::formula::{
    CreateFormulaRequest, ExposureResponse, FormulaExposureResponse, FormulaIngredientItem,
    FormulaIngredientListResponse, FormulaIngredientRequest, FormulaItem, FormulaListResponse,
    PreviewRequest, SyncCompositionRequest, UpdateFormulaRequest, into_rows,
};
use crate::api::dto::search::SearchParams;
use crate::domain::entities::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Lists formulas sorted by name.
///
/// # Endpoint
///
/// `GET /api/formulas?q=<text>&fields=<keys>`
pub async fn formula_list_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<FormulaListResponse>, AppError> {
    let formulas = state.formula_service.list_formulas(&owner).await?;
    let items: Vec<FormulaItem> = formulas.into_iter().map(Into::into).collect();

    Ok(Json(FormulaListResponse {
        items: params.apply(items),
    }))
}

/// Creates an empty formula.
///
/// # Endpoint
///
/// `POST /api/formulas`
///
/// # Errors
///
/// Returns 400 if the name is blank.
pub async fn create_formula_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<CreateFormulaRequest>,
) -> Result<(StatusCode, Json<FormulaItem>), AppError> {
    payload.validate()?;

    let formula = state
        .formula_service
        .create_formula(&owner, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(formula.into())))
}

/// `GET /api/formulas/{id}`
pub async fn get_formula_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<FormulaItem>, AppError> {
    let formula = state.formula_service.get_formula(&owner, id).await?;
    Ok(Json(formula.into()))
}

/// `PATCH /api/formulas/{id}`
pub async fn update_formula_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<UpdateFormulaRequest>,
) -> Result<Json<FormulaItem>, AppError> {
    payload.validate()?;

    let formula = state
        .formula_service
        .rename_formula(&owner, id, &payload.name)
        .await?;

    Ok(Json(formula.into()))
}

/// Deletes a formula together with its composition.
///
/// # Endpoint
///
/// `DELETE /api/formulas/{id}`
pub async fn delete_formula_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<StatusCode, AppError> {
    state.formula_service.delete_formula(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Saved composition, sorted by ingredient name.
///
/// # Endpoint
///
/// `GET /api/formulas/{id}/ingredients`
pub async fn formula_ingredients_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<FormulaIngredientListResponse>, AppError> {
    let lines = state.formula_service.list_ingredients(&owner, id).await?;

    Ok(Json(FormulaIngredientListResponse {
        items: lines.into_iter().map(Into::into).collect(),
    }))
}

/// Adds an ingredient to a formula, or changes its parts.
///
/// # Endpoint
///
/// `POST /api/formulas/{id}/ingredients`
///
/// # Errors
///
/// Returns 404 if the formula or the ingredient does not exist.
pub async fn upsert_formula_ingredient_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<FormulaIngredientRequest>,
) -> Result<(StatusCode, Json<FormulaIngredientItem>), AppError> {
    payload.validate()?;

    let line = state
        .formula_service
        .upsert_ingredient(&owner, id, payload.ingredient_id, payload.parts)
        .await?;

    Ok((StatusCode::CREATED, Json(line.into())))
}

/// Removes an ingredient from a formula. Succeeds when the row is already
/// gone.
///
/// # Endpoint
///
/// `DELETE /api/formulas/{id}/ingredients/{ingredient_id}`
pub async fn delete_formula_ingredient_handler(
    Path((id, ingredient_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<StatusCode, AppError> {
    state
        .formula_service
        .delete_ingredient(&owner, id, ingredient_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Allergen exposure of the saved composition.
///
/// # Endpoint
///
/// `GET /api/formulas/{id}/allergens`
///
/// # Response
///
/// ```json
/// {
///   "formula": { "id": 1, "name": "Chypre", ... },
///   "ingredients": [
///     { "ingredientId": 3, "ingredientName": "Bergamot", "parts": 10,
///       "share": 0.5, "sharePercent": "50.0000%" }
///   ],
///   "allergens": [
///     { "allergenId": 2, "name": "Limonene", "total": 0.125,
///       "percent": "12.5000%", "maxConcentration": null, "exceedsLimit": false }
///   ],
///   "totalExposure": 0.125,
///   "totalPercent": "12.5000%"
/// }
/// ```
pub async fn formula_allergens_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<FormulaExposureResponse>, AppError> {
    let exposure = state
        .composition_service
        .formula_exposure(&owner, id)
        .await?;

    Ok(Json(exposure.into()))
}

/// Allergen exposure of a draft composition. Nothing is written.
///
/// # Endpoint
///
/// `POST /api/formulas/{id}/allergens/preview`
///
/// Rows marked `removed` and rows without an ingredient or parts are
/// ignored.
pub async fn preview_allergens_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<ExposureResponse>, AppError> {
    let rows = into_rows(payload.rows);
    let report = state
        .composition_service
        .preview(&owner, id, &rows)
        .await?;

    Ok(Json(report.into()))
}

/// Saves a draft composition in one transaction.
///
/// # Endpoint
///
/// `PUT /api/formulas/{id}/composition`
///
/// Renames the formula when `name` is given, upserts active rows and
/// deletes rows marked `removed`. Returns the saved composition.
///
/// # Errors
///
/// Returns 400 if two rows name the same ingredient or parts are negative.
/// Returns 404 if the formula or an ingredient does not exist.
pub async fn sync_composition_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<SyncCompositionRequest>,
) -> Result<Json<FormulaIngredientListResponse>, AppError> {
    payload.validate()?;

    let rows = into_rows(payload.rows);
    state
        .formula_service
        .sync_composition(&owner, id, payload.name.as_deref(), &rows)
        .await?;

    let lines = state.formula_service.list_ingredients(&owner, id).await?;

    Ok(Json(FormulaIngredientListResponse {
        items: lines.into_iter().map(Into::into).collect(),
    }))
}
