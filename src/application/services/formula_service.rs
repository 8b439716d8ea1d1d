//! Formula and composition service.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::composition::{CompositionRow, RowStatus};
use crate::domain::entities::{Formula, FormulaIngredient, NewFormula, OwnerId};
use crate::domain::repositories::{FormulaRepository, IngredientRepository};
use crate::error::AppError;
use crate::utils::validation::{normalize_name, validate_id, validate_quantity};
use serde_json::json;

/// Service for formulas and the ingredient rows that make them up.
pub struct FormulaService<F: FormulaRepository, I: IngredientRepository> {
    formulas: Arc<F>,
    ingredients: Arc<I>,
}

impl<F: FormulaRepository, I: IngredientRepository> FormulaService<F, I> {
    /// Creates a new formula service.
    pub fn new(formulas: Arc<F>, ingredients: Arc<I>) -> Self {
        Self {
            formulas,
            ingredients,
        }
    }

    /// Creates an empty formula.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank name.
    pub async fn create_formula(&self, owner: &OwnerId, name: &str) -> Result<Formula, AppError> {
        let name = normalize_name("name", name)?;
        self.formulas.create(owner, NewFormula { name }).await
    }

    /// Lists formulas by name.
    pub async fn list_formulas(&self, owner: &OwnerId) -> Result<Vec<Formula>, AppError> {
        self.formulas.list(owner).await
    }

    /// Retrieves a formula by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the formula does not exist.
    pub async fn get_formula(&self, owner: &OwnerId, id: i64) -> Result<Formula, AppError> {
        self.formulas
            .find_by_id(owner, id)
            .await?
            .ok_or_else(|| formula_not_found(id))
    }

    pub async fn rename_formula(
        &self,
        owner: &OwnerId,
        id: i64,
        name: &str,
    ) -> Result<Formula, AppError> {
        let name = normalize_name("name", name)?;
        self.formulas.rename(owner, id, &name).await
    }

    /// Deletes a formula together with its composition.
    pub async fn delete_formula(&self, owner: &OwnerId, id: i64) -> Result<(), AppError> {
        if !self.formulas.delete(owner, id).await? {
            return Err(formula_not_found(id));
        }
        Ok(())
    }

    /// Saved composition, ordered by ingredient name.
    pub async fn list_ingredients(
        &self,
        owner: &OwnerId,
        formula_id: i64,
    ) -> Result<Vec<FormulaIngredient>, AppError> {
        self.get_formula(owner, formula_id).await?;
        self.formulas.list_ingredients(owner, formula_id).await
    }

    /// Adds an ingredient to a formula, or changes its parts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for negative or non-finite parts.
    /// Returns [`AppError::NotFound`] if the formula or the ingredient does not exist.
    pub async fn upsert_ingredient(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        ingredient_id: i64,
        parts: f64,
    ) -> Result<FormulaIngredient, AppError> {
        validate_id("ingredientId", ingredient_id)?;
        let parts = validate_quantity("parts", parts)?;

        self.get_formula(owner, formula_id).await?;
        self.ensure_ingredient(owner, ingredient_id).await?;

        self.formulas
            .upsert_ingredient(owner, formula_id, ingredient_id, parts)
            .await
    }

    /// Removes an ingredient from a formula. Removing a missing row succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the formula does not exist.
    pub async fn delete_ingredient(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        ingredient_id: i64,
    ) -> Result<(), AppError> {
        self.get_formula(owner, formula_id).await?;
        self.formulas
            .delete_ingredient(owner, formula_id, ingredient_id)
            .await?;
        Ok(())
    }

    /// Saves an edited composition.
    ///
    /// Active rows are upserted, rows marked removed are deleted, and
    /// incomplete rows (no ingredient or no parts yet) are ignored. The
    /// formula is renamed when `name` is given. Everything is written in
    /// one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if two active rows name the same
    /// ingredient or a row has negative or non-finite parts.
    /// Returns [`AppError::NotFound`] if the formula or an ingredient does not exist.
    pub async fn sync_composition(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        name: Option<&str>,
        rows: &[CompositionRow],
    ) -> Result<Formula, AppError> {
        let name = name.map(|n| normalize_name("name", n)).transpose()?;
        let (upserts, removals) = plan_sync(rows)?;

        self.get_formula(owner, formula_id).await?;
        for (ingredient_id, _) in &upserts {
            self.ensure_ingredient(owner, *ingredient_id).await?;
        }

        tracing::debug!(
            formula_id,
            upserts = upserts.len(),
            removals = removals.len(),
            "Syncing composition"
        );

        self.formulas
            .sync_composition(owner, formula_id, name, upserts, removals)
            .await
    }

    async fn ensure_ingredient(&self, owner: &OwnerId, ingredient_id: i64) -> Result<(), AppError> {
        if self
            .ingredients
            .find_by_id(owner, ingredient_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(
                "Ingredient not found",
                json!({ "id": ingredient_id }),
            ));
        }
        Ok(())
    }
}

type SyncPlan = (Vec<(i64, f64)>, Vec<i64>);

/// Splits edited rows into upserts and removals.
///
/// A removed row whose ingredient is also present in an active row is not
/// deleted: the active row replaces it.
fn plan_sync(rows: &[CompositionRow]) -> Result<SyncPlan, AppError> {
    let mut upserts = Vec::new();
    let mut seen = HashSet::new();

    for row in rows.iter().filter(|r| r.status != RowStatus::Removed) {
        if let Some(parts) = row.parts {
            validate_quantity("parts", parts)?;
        }
        let Some((ingredient_id, parts)) = row.active() else {
            continue;
        };
        validate_id("ingredientId", ingredient_id)?;
        if !seen.insert(ingredient_id) {
            return Err(AppError::bad_request(
                "Ingredient appears more than once in the formula",
                json!({ "ingredientId": ingredient_id }),
            ));
        }
        upserts.push((ingredient_id, parts));
    }

    let removals: Vec<i64> = rows
        .iter()
        .filter(|r| r.status == RowStatus::Removed)
        .filter_map(|r| r.ingredient_id)
        .filter(|id| !seen.contains(id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    Ok((upserts, removals))
}

fn formula_not_found(id: i64) -> AppError {
    AppError::not_found("Formula not found", json!({ "id": id }))
}
