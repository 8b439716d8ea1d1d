//! PostgreSQL implementation of ingredient repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::composition::AllergenShare;
use crate::domain::entities::{
    AllergenLinkInput, Ingredient, IngredientAllergenRow, NewIngredient, OwnerId,
};
use crate::domain::repositories::IngredientRepository;
use crate::error::AppError;

/// PostgreSQL repository for ingredients and their allergen links.
pub struct PgIngredientRepository {
    pool: Arc<PgPool>,
}

impl PgIngredientRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IngredientRow {
    id: i64,
    name: String,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IngredientRow> for Ingredient {
    fn from(r: IngredientRow) -> Self {
        Ingredient::new(r.id, r.name, r.owner_id, r.created_at, r.updated_at)
    }
}

#[derive(sqlx::FromRow)]
struct ShareRow {
    allergen_id: i64,
    allergen_name: String,
    concentration: f64,
}

impl From<ShareRow> for AllergenShare {
    fn from(r: ShareRow) -> Self {
        AllergenShare {
            allergen_id: r.allergen_id,
            allergen_name: r.allergen_name,
            concentration: r.concentration,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OverviewRow {
    ingredient_id: i64,
    allergen_id: i64,
    allergen_name: Option<String>,
    concentration: f64,
}

const UPSERT_LINK: &str = r#"
    INSERT INTO ingredient_allergens (ingredient_id, allergen_id, concentration, owner_id)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (ingredient_id, allergen_id)
    DO UPDATE SET concentration = EXCLUDED.concentration
"#;

#[async_trait]
impl IngredientRepository for PgIngredientRepository {
    async fn create(
        &self,
        owner: &OwnerId,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            INSERT INTO ingredients (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(&new_ingredient.name)
        .bind(owner.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for link in &new_ingredient.allergens {
            sqlx::query(UPSERT_LINK)
                .bind(row.id)
                .bind(link.allergen_id)
                .bind(link.concentration)
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> Result<Option<Ingredient>, AppError> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM ingredients
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<Ingredient>, AppError> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM ingredients
            WHERE owner_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all_allergen_rows(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<IngredientAllergenRow>, AppError> {
        let rows = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT ia.ingredient_id, ia.allergen_id, a.name AS allergen_name, ia.concentration
            FROM ingredient_allergens ia
            LEFT JOIN allergens a ON a.id = ia.allergen_id
            WHERE ia.owner_id = $1
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| IngredientAllergenRow {
                ingredient_id: r.ingredient_id,
                allergen_id: r.allergen_id,
                allergen_name: r.allergen_name,
                concentration: r.concentration,
            })
            .collect())
    }

    async fn rename(&self, owner: &OwnerId, id: i64, name: &str) -> Result<Ingredient, AppError> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            UPDATE ingredients
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
            AppError::not_found("Ingredient not found", serde_json::json!({ "id": id }))
        })
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.as_str())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_formula_usages(&self, owner: &OwnerId, id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM formula_ingredients WHERE ingredient_id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn list_allergens(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
    ) -> Result<Vec<AllergenShare>, AppError> {
        let rows = sqlx::query_as::<_, ShareRow>(
            r#"
            SELECT ia.allergen_id, a.name AS allergen_name, ia.concentration
            FROM ingredient_allergens ia
            JOIN allergens a ON a.id = ia.allergen_id
            WHERE ia.ingredient_id = $1 AND ia.owner_id = $2
            ORDER BY a.name, ia.allergen_id
            "#,
        )
        .bind(ingredient_id)
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_allergen(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        link: AllergenLinkInput,
    ) -> Result<AllergenShare, AppError> {
        let row = sqlx::query_as::<_, ShareRow>(
            r#"
            WITH upserted AS (
                INSERT INTO ingredient_allergens (ingredient_id, allergen_id, concentration, owner_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (ingredient_id, allergen_id)
                DO UPDATE SET concentration = EXCLUDED.concentration
                RETURNING allergen_id, concentration
            )
            SELECT u.allergen_id, a.name AS allergen_name, u.concentration
            FROM upserted u
            JOIN allergens a ON a.id = u.allergen_id
            "#,
        )
        .bind(ingredient_id)
        .bind(link.allergen_id)
        .bind(link.concentration)
        .bind(owner.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn delete_allergen(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        allergen_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM ingredient_allergens
            WHERE ingredient_id = $1 AND allergen_id = $2 AND owner_id = $3
            "#,
        )
        .bind(ingredient_id)
        .bind(allergen_id)
        .bind(owner.as_str())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
