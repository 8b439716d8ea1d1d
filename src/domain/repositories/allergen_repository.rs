//! Repository trait for allergen data access.

use std::collections::HashMap;

use crate::domain::entities::{Allergen, AllergenPatch, NewAllergen, OwnerId};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing allergens.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAllergenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllergenRepository: Send + Sync {
    /// Creates a new allergen.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, owner: &OwnerId, new_allergen: NewAllergen)
    -> Result<Allergen, AppError>;

    /// Finds an allergen by id.
    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> Result<Option<Allergen>, AppError>;

    /// Lists all allergens ordered by name.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Allergen>, AppError>;

    /// Partially updates an allergen.
    ///
    /// Only fields present in [`AllergenPatch`] are modified.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the allergen does not exist.
    async fn update(
        &self,
        owner: &OwnerId,
        id: i64,
        patch: AllergenPatch,
    ) -> Result<Allergen, AppError>;

    /// Deletes an allergen. Returns `Ok(false)` if nothing was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if an ingredient still links to it.
    async fn delete(&self, owner: &OwnerId, id: i64) -> Result<bool, AppError>;

    /// Counts ingredient links that reference the allergen.
    async fn count_links(&self, owner: &OwnerId, id: i64) -> Result<i64, AppError>;

    /// Ids of the ingredients that contain the allergen.
    async fn linked_ingredient_ids(&self, owner: &OwnerId, id: i64) -> Result<Vec<i64>, AppError>;

    /// Regulatory ceilings of the given allergens, keyed by id.
    ///
    /// Allergens without a ceiling are absent from the map.
    async fn max_concentrations(
        &self,
        owner: &OwnerId,
        ids: Vec<i64>,
    ) -> Result<HashMap<i64, f64>, AppError>;

    /// Counts allergens, across all owners.
    async fn count(&self) -> Result<i64, AppError>;
}
