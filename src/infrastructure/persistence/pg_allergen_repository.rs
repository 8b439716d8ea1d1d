//! PostgreSQL implementation of allergen repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{Allergen, AllergenPatch, NewAllergen, OwnerId};
use crate::domain::repositories::AllergenRepository;
use crate::error::AppError;

/// PostgreSQL repository for allergen storage and retrieval.
pub struct PgAllergenRepository {
    pool: Arc<PgPool>,
}

impl PgAllergenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AllergenRow {
    id: i64,
    name: String,
    cas_number: Option<String>,
    max_concentration: Option<f64>,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AllergenRow> for Allergen {
    fn from(r: AllergenRow) -> Self {
        Allergen::new(
            r.id,
            r.name,
            r.cas_number,
            r.max_concentration,
            r.owner_id,
            r.created_at,
            r.updated_at,
        )
    }
}

#[async_trait]
impl AllergenRepository for PgAllergenRepository {
    async fn create(
        &self,
        owner: &OwnerId,
        new_allergen: NewAllergen,
    ) -> Result<Allergen, AppError> {
        let row = sqlx::query_as::<_, AllergenRow>(
            r#"
            INSERT INTO allergens (name, cas_number, max_concentration, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, cas_number, max_concentration, owner_id, created_at, updated_at
            "#,
        )
        .bind(&new_allergen.name)
        .bind(&new_allergen.cas_number)
        .bind(new_allergen.max_concentration)
        .bind(owner.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> Result<Option<Allergen>, AppError> {
        let row = sqlx::query_as::<_, AllergenRow>(
            r#"
            SELECT id, name, cas_number, max_concentration, owner_id, created_at, updated_at
            FROM allergens
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<Allergen>, AppError> {
        let rows = sqlx::query_as::<_, AllergenRow>(
            r#"
            SELECT id, name, cas_number, max_concentration, owner_id, created_at, updated_at
            FROM allergens
            WHERE owner_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: i64,
        patch: AllergenPatch,
    ) -> Result<Allergen, AppError> {
        // The flags tell "leave unchanged" apart from "set to NULL".
        let row = sqlx::query_as::<_, AllergenRow>(
            r#"
            UPDATE allergens
            SET
                name = COALESCE($3, name),
                cas_number = CASE WHEN $4::boolean THEN $5::text ELSE cas_number END,
                max_concentration = CASE WHEN $6::boolean THEN $7::float8 ELSE max_concentration END,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, cas_number, max_concentration, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .bind(patch.name)
        .bind(patch.cas_number.is_some())
        .bind(patch.cas_number.flatten())
        .bind(patch.max_concentration.is_some())
        .bind(patch.max_concentration.flatten())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into).ok_or_else(|| {
            AppError::not_found("Allergen not found", serde_json::json!({ "id": id }))
        })
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM allergens WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.as_str())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_links(&self, owner: &OwnerId, id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ingredient_allergens WHERE allergen_id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn linked_ingredient_ids(&self, owner: &OwnerId, id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT ingredient_id FROM ingredient_allergens
            WHERE allergen_id = $1 AND owner_id = $2
            ORDER BY ingredient_id
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn max_concentrations(
        &self,
        owner: &OwnerId,
        ids: Vec<i64>,
    ) -> Result<HashMap<i64, f64>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, f64)> = sqlx::query_as(
            r#"
            SELECT id, max_concentration
            FROM allergens
            WHERE id = ANY($1) AND owner_id = $2 AND max_concentration IS NOT NULL
            "#,
        )
        .bind(&ids)
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM allergens")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
