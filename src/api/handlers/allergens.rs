//! Handlers for allergen endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::allergen::{
    AllergenItem, AllergenListResponse, CreateAllergenRequest, UpdateAllergenRequest,
};
use crate::api::dto::search::SearchParams;
use crate::domain::entities::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Lists allergens sorted by name.
///
/// # Endpoint
///
/// `GET /api/allergens?q=<text>&fields=<keys>`
pub async fn allergen_list_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<AllergenListResponse>, AppError> {
    let allergens = state.allergen_service.list_allergens(&owner).await?;
    let items: Vec<AllergenItem> = allergens.into_iter().map(Into::into).collect();

    Ok(Json(AllergenListResponse {
        items: params.apply(items),
    }))
}

/// Creates an allergen.
///
/// # Endpoint
///
/// `POST /api/allergens`
///
/// # Errors
///
/// Returns 400 if the name is blank, the CAS number is malformed or the
/// ceiling is negative.
pub async fn create_allergen_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<CreateAllergenRequest>,
) -> Result<(StatusCode, Json<AllergenItem>), AppError> {
    payload.validate()?;

    let allergen = state
        .allergen_service
        .create_allergen(
            &owner,
            &payload.name,
            payload.cas_number.as_deref(),
            payload.max_concentration,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(allergen.into())))
}

/// `GET /api/allergens/{id}`
pub async fn get_allergen_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<AllergenItem>, AppError> {
    let allergen = state.allergen_service.get_allergen(&owner, id).await?;
    Ok(Json(allergen.into()))
}

/// Partially updates an allergen.
///
/// # Endpoint
///
/// `PATCH /api/allergens/{id}`
///
/// `casNumber: null` and `maxConcentration: null` clear the value.
///
/// # Errors
///
/// Returns 404 if the allergen does not exist.
pub async fn update_allergen_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<UpdateAllergenRequest>,
) -> Result<Json<AllergenItem>, AppError> {
    payload.validate()?;

    let allergen = state
        .allergen_service
        .update_allergen(&owner, id, payload.into())
        .await?;

    Ok(Json(allergen.into()))
}

/// Deletes an allergen.
///
/// # Endpoint
///
/// `DELETE /api/allergens/{id}`
///
/// # Errors
///
/// Returns 404 if the allergen does not exist.
/// Returns 422 if an ingredient still lists it.
pub async fn delete_allergen_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<StatusCode, AppError> {
    state.allergen_service.delete_allergen(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
