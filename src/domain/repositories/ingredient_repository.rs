//! Repository trait for ingredient data access.

use crate::domain::composition::AllergenShare;
use crate::domain::entities::{
    AllergenLinkInput, Ingredient, IngredientAllergenRow, NewIngredient, OwnerId,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for ingredients and their allergen profiles.
///
/// Every call is scoped by the owner; records of other owners behave as if
/// they did not exist.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgIngredientRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_ingredient.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Creates an ingredient together with its initial allergen links.
    ///
    /// The ingredient and the links are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if a referenced allergen does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, owner: &OwnerId, new_ingredient: NewIngredient)
    -> Result<Ingredient, AppError>;

    /// Finds an ingredient by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> Result<Option<Ingredient>, AppError>;

    /// Lists all ingredients ordered by name.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Ingredient>, AppError>;

    /// Lists every ingredient-allergen link of the owner, joined with allergen names.
    ///
    /// Feeds the ingredient overview; one query instead of one per ingredient.
    async fn list_all_allergen_rows(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<IngredientAllergenRow>, AppError>;

    /// Renames an ingredient.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the ingredient does not exist.
    async fn rename(&self, owner: &OwnerId, id: i64, name: &str) -> Result<Ingredient, AppError>;

    /// Deletes an ingredient and its allergen links.
    ///
    /// Returns `Ok(false)` if nothing was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if a formula still references the ingredient.
    async fn delete(&self, owner: &OwnerId, id: i64) -> Result<bool, AppError>;

    /// Counts formula rows that reference the ingredient.
    async fn count_formula_usages(&self, owner: &OwnerId, id: i64) -> Result<i64, AppError>;

    /// Returns the allergen profile of an ingredient, ordered by allergen name.
    async fn list_allergens(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
    ) -> Result<Vec<AllergenShare>, AppError>;

    /// Inserts or updates one allergen link and returns the joined row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if the allergen does not exist.
    async fn upsert_allergen(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        link: AllergenLinkInput,
    ) -> Result<AllergenShare, AppError>;

    /// Removes one allergen link. Returns `Ok(false)` if there was none.
    async fn delete_allergen(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        allergen_id: i64,
    ) -> Result<bool, AppError>;

    /// Counts ingredients, across all owners.
    ///
    /// Used by the admin CLI.
    async fn count(&self) -> Result<i64, AppError>;
}
