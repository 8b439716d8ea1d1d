//! PostgreSQL implementation of formula repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Formula, FormulaIngredient, NewFormula, OwnerId};
use crate::domain::repositories::FormulaRepository;
use crate::error::AppError;

/// PostgreSQL repository for formulas and their composition rows.
pub struct PgFormulaRepository {
    pool: Arc<PgPool>,
}

impl PgFormulaRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FormulaRow {
    id: i64,
    name: String,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FormulaRow> for Formula {
    fn from(r: FormulaRow) -> Self {
        Formula::new(r.id, r.name, r.owner_id, r.created_at, r.updated_at)
    }
}

#[derive(sqlx::FromRow)]
struct CompositionRow {
    ingredient_id: i64,
    ingredient_name: String,
    parts: f64,
}

impl From<CompositionRow> for FormulaIngredient {
    fn from(r: CompositionRow) -> Self {
        FormulaIngredient {
            ingredient_id: r.ingredient_id,
            ingredient_name: r.ingredient_name,
            parts: r.parts,
        }
    }
}

const UPSERT_INGREDIENT: &str = r#"
    INSERT INTO formula_ingredients (formula_id, ingredient_id, parts, owner_id)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (formula_id, ingredient_id, owner_id)
    DO UPDATE SET parts = EXCLUDED.parts
"#;

const DELETE_INGREDIENT: &str = r#"
    DELETE FROM formula_ingredients
    WHERE formula_id = $1 AND ingredient_id = $2 AND owner_id = $3
"#;

#[async_trait]
impl FormulaRepository for PgFormulaRepository {
    async fn create(&self, owner: &OwnerId, new_formula: NewFormula) -> Result<Formula, AppError> {
        let row = sqlx::query_as::<_, FormulaRow>(
            r#"
            INSERT INTO formulas (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(&new_formula.name)
        .bind(owner.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> Result<Option<Formula>, AppError> {
        let row = sqlx::query_as::<_, FormulaRow>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM formulas
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<Formula>, AppError> {
        let rows = sqlx::query_as::<_, FormulaRow>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM formulas
            WHERE owner_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn rename(&self, owner: &OwnerId, id: i64, name: &str) -> Result<Formula, AppError> {
        let row = sqlx::query_as::<_, FormulaRow>(
            r#"
            UPDATE formulas
            SET name = $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into).ok_or_else(|| {
            AppError::not_found("Formula not found", serde_json::json!({ "id": id }))
        })
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM formulas WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.as_str())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_ingredients(
        &self,
        owner: &OwnerId,
        formula_id: i64,
    ) -> Result<Vec<FormulaIngredient>, AppError> {
        let rows = sqlx::query_as::<_, CompositionRow>(
            r#"
            SELECT fi.ingredient_id, i.name AS ingredient_name, fi.parts
            FROM formula_ingredients fi
            JOIN ingredients i ON i.id = fi.ingredient_id
            WHERE fi.formula_id = $1 AND fi.owner_id = $2
            ORDER BY i.name, fi.ingredient_id
            "#,
        )
        .bind(formula_id)
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_ingredient(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        ingredient_id: i64,
        parts: f64,
    ) -> Result<FormulaIngredient, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(UPSERT_INGREDIENT)
            .bind(formula_id)
            .bind(ingredient_id)
            .bind(parts)
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE formulas SET updated_at = NOW() WHERE id = $1 AND owner_id = $2")
            .bind(formula_id)
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, CompositionRow>(
            r#"
            SELECT fi.ingredient_id, i.name AS ingredient_name, fi.parts
            FROM formula_ingredients fi
            JOIN ingredients i ON i.id = fi.ingredient_id
            WHERE fi.formula_id = $1 AND fi.ingredient_id = $2 AND fi.owner_id = $3
            "#,
        )
        .bind(formula_id)
        .bind(ingredient_id)
        .bind(owner.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn delete_ingredient(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        ingredient_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(DELETE_INGREDIENT)
            .bind(formula_id)
            .bind(ingredient_id)
            .bind(owner.as_str())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn sync_composition(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        name: Option<String>,
        upserts: Vec<(i64, f64)>,
        removals: Vec<i64>,
    ) -> Result<Formula, AppError> {
        let mut tx = self.pool.begin().await?;

        let formula = sqlx::query_as::<_, FormulaRow>(
            r#"
            UPDATE formulas
            SET name = COALESCE($3, name), updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(formula_id)
        .bind(owner.as_str())
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Formula not found", serde_json::json!({ "id": formula_id }))
        })?;

        for ingredient_id in removals {
            sqlx::query(DELETE_INGREDIENT)
                .bind(formula_id)
                .bind(ingredient_id)
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await?;
        }

        for (ingredient_id, parts) in upserts {
            sqlx::query(UPSERT_INGREDIENT)
                .bind(formula_id)
                .bind(ingredient_id)
                .bind(parts)
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(formula.into())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM formulas")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
