//! Repository trait for formula data access.

use crate::domain::entities::{Formula, FormulaIngredient, NewFormula, OwnerId};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for formulas and their compositions.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgFormulaRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_formula.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormulaRepository: Send + Sync {
    /// Creates an empty formula.
    async fn create(&self, owner: &OwnerId, new_formula: NewFormula) -> Result<Formula, AppError>;

    /// Finds a formula by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Formula))` if found
    /// - `Ok(None)` if not found or owned by someone else
    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> Result<Option<Formula>, AppError>;

    /// Lists all formulas ordered by name.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Formula>, AppError>;

    /// Renames a formula and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the formula does not exist.
    async fn rename(&self, owner: &OwnerId, id: i64, name: &str) -> Result<Formula, AppError>;

    /// Deletes a formula and, by cascade, its composition.
    ///
    /// Returns `Ok(false)` if nothing was deleted.
    async fn delete(&self, owner: &OwnerId, id: i64) -> Result<bool, AppError>;

    /// Returns the saved composition ordered by ingredient name.
    async fn list_ingredients(
        &self,
        owner: &OwnerId,
        formula_id: i64,
    ) -> Result<Vec<FormulaIngredient>, AppError>;

    /// Inserts or updates one composition row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if the ingredient does not exist.
    async fn upsert_ingredient(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        ingredient_id: i64,
        parts: f64,
    ) -> Result<FormulaIngredient, AppError>;

    /// Removes one composition row. Returns `Ok(false)` if there was none.
    async fn delete_ingredient(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        ingredient_id: i64,
    ) -> Result<bool, AppError>;

    /// Applies an edited composition in one transaction.
    ///
    /// Renames the formula when `name` is given, upserts every row in
    /// `upserts` as `(ingredient_id, parts)` and deletes the rows of
    /// `removals`. Either everything is written or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the formula does not exist.
    /// Returns [`AppError::InUse`] if an upserted ingredient does not exist.
    async fn sync_composition(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        name: Option<String>,
        upserts: Vec<(i64, f64)>,
        removals: Vec<i64>,
    ) -> Result<Formula, AppError>;

    /// Counts formulas, across all owners.
    async fn count(&self) -> Result<i64, AppError>;
}
