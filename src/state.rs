//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AllergenService, AuthService, CompositionService, FormulaService, IngredientService,
    ProfileFetchSettings,
};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{
    PgAllergenRepository, PgFormulaRepository, PgIngredientRepository, PgTokenRepository,
};

pub type PgIngredientService = IngredientService<PgIngredientRepository, PgAllergenRepository>;
pub type PgAllergenService = AllergenService<PgAllergenRepository>;
pub type PgFormulaService = FormulaService<PgFormulaRepository, PgIngredientRepository>;
pub type PgCompositionService =
    CompositionService<PgFormulaRepository, PgIngredientRepository, PgAllergenRepository>;
pub type PgAuthService = AuthService<PgTokenRepository>;

/// Cloneable state shared by the API and the dashboard.
///
/// Every field is reference counted, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<PgPool>,
    pub ingredient_service: Arc<PgIngredientService>,
    pub allergen_service: Arc<PgAllergenService>,
    pub formula_service: Arc<PgFormulaService>,
    pub composition_service: Arc<PgCompositionService>,
    pub auth_service: Arc<PgAuthService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    /// Wires repositories and services on top of a connection pool.
    pub fn new(
        pool: Arc<PgPool>,
        cache: Arc<dyn CacheService>,
        signing_secret: String,
        profile_fetch: ProfileFetchSettings,
    ) -> Self {
        let ingredient_repo = Arc::new(PgIngredientRepository::new(pool.clone()));
        let allergen_repo = Arc::new(PgAllergenRepository::new(pool.clone()));
        let formula_repo = Arc::new(PgFormulaRepository::new(pool.clone()));
        let token_repo = Arc::new(PgTokenRepository::new(pool.clone()));

        Self {
            ingredient_service: Arc::new(IngredientService::new(
                ingredient_repo.clone(),
                allergen_repo.clone(),
                cache.clone(),
            )),
            allergen_service: Arc::new(AllergenService::new(
                allergen_repo.clone(),
                cache.clone(),
            )),
            formula_service: Arc::new(FormulaService::new(
                formula_repo.clone(),
                ingredient_repo.clone(),
            )),
            composition_service: Arc::new(CompositionService::new(
                formula_repo,
                ingredient_repo,
                allergen_repo,
                cache.clone(),
                profile_fetch,
            )),
            auth_service: Arc::new(AuthService::new(token_repo, signing_secret)),
            pool,
            cache,
        }
    }
}
