#![allow(dead_code)]

use axum::{Router, middleware};
use axum_test::TestServer;
use perfume_formulary::api::middleware::auth;
use perfume_formulary::api::routes::protected_routes;
use perfume_formulary::application::services::{ProfileFetchSettings, hash_token};
use perfume_formulary::domain::entities::OwnerId;
use perfume_formulary::domain::repositories::TokenRepository;
use perfume_formulary::infrastructure::cache::NullCache;
use perfume_formulary::infrastructure::persistence::PgTokenRepository;
use perfume_formulary::state::AppState;
use sqlx::PgPool;
use std::sync::Arc;

pub const SIGNING_SECRET: &str = "test-signing-secret";

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::new(
        Arc::new(pool),
        Arc::new(NullCache::new()),
        SIGNING_SECRET.to_string(),
        ProfileFetchSettings {
            retry_base_delay_ms: 1,
            ..ProfileFetchSettings::default()
        },
    )
}

/// Stores a token for `owner` and returns its raw value.
pub async fn create_token(pool: &PgPool, owner: &str) -> String {
    let raw = format!("token-for-{owner}");
    let hash = hash_token(SIGNING_SECRET, &raw).unwrap();

    PgTokenRepository::new(Arc::new(pool.clone()))
        .create_token(&format!("test {owner}"), &hash, owner)
        .await
        .unwrap();

    raw
}

/// API router behind Bearer auth, without rate limiting (no peer address
/// in tests). Returns the server and a token for the default owner.
pub async fn api_server(pool: PgPool) -> (TestServer, String) {
    let token = create_token(&pool, OwnerId::DEFAULT).await;
    let state = create_test_state(pool);

    let api = protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
    let app = Router::new().nest("/api", api).with_state(state);

    (TestServer::new(app).unwrap(), token)
}

pub async fn insert_ingredient(pool: &PgPool, owner: &str, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO ingredients (name, owner_id) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(owner)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_allergen(
    pool: &PgPool,
    owner: &str,
    name: &str,
    max_concentration: Option<f64>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO allergens (name, max_concentration, owner_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(max_concentration)
    .bind(owner)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn link_allergen(
    pool: &PgPool,
    owner: &str,
    ingredient_id: i64,
    allergen_id: i64,
    concentration: f64,
) {
    sqlx::query(
        "INSERT INTO ingredient_allergens (ingredient_id, allergen_id, concentration, owner_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(ingredient_id)
    .bind(allergen_id)
    .bind(concentration)
    .bind(owner)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_formula(pool: &PgPool, owner: &str, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO formulas (name, owner_id) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(owner)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn add_to_formula(
    pool: &PgPool,
    owner: &str,
    formula_id: i64,
    ingredient_id: i64,
    parts: f64,
) {
    sqlx::query(
        "INSERT INTO formula_ingredients (formula_id, ingredient_id, parts, owner_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(formula_id)
    .bind(ingredient_id)
    .bind(parts)
    .bind(owner)
    .execute(pool)
    .await
    .unwrap();
}
