//! Handlers for ingredient endpoints and their allergen profiles.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::ingredient::{
    AllergenLinkRequest, CreateIngredientRequest, IngredientAllergenItem,
    IngredientAllergenListResponse, IngredientItem, IngredientListResponse, IngredientSummaryItem,
    UpdateIngredientRequest,
};
use crate::api::dto::search::SearchParams;
use crate::domain::entities::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Lists ingredients with an overview of their allergens.
///
/// # Endpoint
///
/// `GET /api/ingredients?q=<text>&fields=<keys>`
///
/// Sorted by name. `q` filters case-insensitively on `fields`
/// (default `name`).
pub async fn ingredient_list_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<IngredientListResponse>, AppError> {
    let summaries = state.ingredient_service.list_summaries(&owner).await?;
    let items: Vec<IngredientSummaryItem> = summaries.into_iter().map(Into::into).collect();

    Ok(Json(IngredientListResponse {
        items: params.apply(items),
    }))
}

/// Creates an ingredient, optionally with its allergen profile.
///
/// # Endpoint
///
/// `POST /api/ingredients`
///
/// # Errors
///
/// Returns 400 if the name is blank or a concentration is negative.
/// Returns 404 if a listed allergen does not exist.
pub async fn create_ingredient_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientItem>), AppError> {
    payload.validate()?;

    let allergens = payload.allergens.into_iter().map(Into::into).collect();
    let ingredient = state
        .ingredient_service
        .create_ingredient(&owner, &payload.name, allergens)
        .await?;

    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

/// `GET /api/ingredients/{id}`
pub async fn get_ingredient_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<IngredientItem>, AppError> {
    let ingredient = state.ingredient_service.get_ingredient(&owner, id).await?;
    Ok(Json(ingredient.into()))
}

/// Renames an ingredient.
///
/// # Endpoint
///
/// `PATCH /api/ingredients/{id}`
pub async fn update_ingredient_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<UpdateIngredientRequest>,
) -> Result<Json<IngredientItem>, AppError> {
    payload.validate()?;

    let ingredient = state
        .ingredient_service
        .rename_ingredient(&owner, id, &payload.name)
        .await?;

    Ok(Json(ingredient.into()))
}

/// Deletes an ingredient and its allergen profile.
///
/// # Endpoint
///
/// `DELETE /api/ingredients/{id}`
///
/// # Errors
///
/// Returns 404 if the ingredient does not exist.
/// Returns 422 if a formula still uses it.
pub async fn delete_ingredient_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<StatusCode, AppError> {
    state.ingredient_service.delete_ingredient(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Allergen profile of one ingredient, sorted by allergen name.
///
/// # Endpoint
///
/// `GET /api/ingredients/{id}/allergens`
pub async fn ingredient_allergens_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<IngredientAllergenListResponse>, AppError> {
    let shares = state.ingredient_service.list_allergens(&owner, id).await?;

    Ok(Json(IngredientAllergenListResponse {
        items: shares.into_iter().map(Into::into).collect(),
    }))
}

/// Adds an allergen to an ingredient, or changes its concentration.
///
/// # Endpoint
///
/// `POST /api/ingredients/{id}/allergens`
///
/// # Errors
///
/// Returns 404 if the ingredient or the allergen does not exist.
pub async fn upsert_ingredient_allergen_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<AllergenLinkRequest>,
) -> Result<(StatusCode, Json<IngredientAllergenItem>), AppError> {
    payload.validate()?;

    let share = state
        .ingredient_service
        .upsert_allergen(&owner, id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(share.into())))
}

/// Removes an allergen from an ingredient. Succeeds when the link is
/// already gone.
///
/// # Endpoint
///
/// `DELETE /api/ingredients/{id}/allergens/{allergen_id}`
pub async fn delete_ingredient_allergen_handler(
    Path((id, allergen_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<StatusCode, AppError> {
    state
        .ingredient_service
        .delete_allergen(&owner, id, allergen_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
