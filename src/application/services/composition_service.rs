//! Allergen exposure of formulas.
//!
//! Loads the allergen profile of every ingredient in a composition and feeds
//! the pure aggregation in [`crate::domain::composition`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use crate::domain::composition::{
    AllergenExposure, AllergenProfiles, AllergenShare, CompositionRow, aggregate_allergens,
    annotate_limits, ingredient_shares,
};
use crate::domain::entities::{Formula, OwnerId};
use crate::domain::repositories::{AllergenRepository, FormulaRepository, IngredientRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use serde_json::json;

/// Upper bound for a single backoff delay between profile fetch attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Tuning for profile loading.
#[derive(Debug, Clone, Copy)]
pub struct ProfileFetchSettings {
    /// Profiles fetched from the database at the same time.
    pub concurrency: usize,
    /// Extra attempts after a failed fetch.
    pub retries: usize,
    /// First backoff delay in milliseconds. Later delays grow exponentially
    /// up to [`MAX_RETRY_DELAY`].
    pub retry_base_delay_ms: u64,
}

impl Default for ProfileFetchSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            retries: 2,
            retry_base_delay_ms: 50,
        }
    }
}

/// One saved composition row with its share of the whole formula.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedIngredient {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub parts: f64,
    pub share: f64,
}

/// Per-allergen exposure plus the overall allergen fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureReport {
    pub allergens: Vec<AllergenExposure>,
    pub total_exposure: f64,
}

/// A saved formula with its composition and allergen exposure.
#[derive(Debug, Clone)]
pub struct FormulaExposure {
    pub formula: Formula,
    pub ingredients: Vec<ComposedIngredient>,
    pub report: ExposureReport,
}

/// Computes allergen exposure for saved formulas and unsaved drafts.
///
/// Profiles are read through the cache first. Misses are fetched
/// concurrently (bounded by [`ProfileFetchSettings::concurrency`]) and each
/// fetch is retried with exponential backoff. A profile that cannot be
/// loaded is logged and counts as "no known allergens"; the calculation
/// still completes with the data it has.
pub struct CompositionService<F, I, A>
where
    F: FormulaRepository,
    I: IngredientRepository,
    A: AllergenRepository,
{
    formulas: Arc<F>,
    ingredients: Arc<I>,
    allergens: Arc<A>,
    cache: Arc<dyn CacheService>,
    settings: ProfileFetchSettings,
}

impl<F, I, A> CompositionService<F, I, A>
where
    F: FormulaRepository,
    I: IngredientRepository + 'static,
    A: AllergenRepository,
{
    /// Creates a new composition service.
    pub fn new(
        formulas: Arc<F>,
        ingredients: Arc<I>,
        allergens: Arc<A>,
        cache: Arc<dyn CacheService>,
        settings: ProfileFetchSettings,
    ) -> Self {
        Self {
            formulas,
            ingredients,
            allergens,
            cache,
            settings,
        }
    }

    /// Exposure of a formula as it is saved.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the formula does not exist.
    pub async fn formula_exposure(
        &self,
        owner: &OwnerId,
        formula_id: i64,
    ) -> Result<FormulaExposure, AppError> {
        let formula = self.find_formula(owner, formula_id).await?;
        let lines = self.formulas.list_ingredients(owner, formula_id).await?;

        let rows: Vec<CompositionRow> = lines
            .iter()
            .map(|l| CompositionRow::existing(l.ingredient_id, l.parts))
            .collect();

        let shares: HashMap<i64, f64> = ingredient_shares(&rows)
            .into_iter()
            .map(|s| (s.ingredient_id, s.share))
            .collect();

        let ingredients = lines
            .into_iter()
            .map(|l| ComposedIngredient {
                share: shares.get(&l.ingredient_id).copied().unwrap_or(0.0),
                ingredient_id: l.ingredient_id,
                ingredient_name: l.ingredient_name,
                parts: l.parts,
            })
            .collect();

        let report = self.report(owner, &rows).await?;

        Ok(FormulaExposure {
            formula,
            ingredients,
            report,
        })
    }

    /// Exposure of an edited composition that has not been saved yet.
    ///
    /// Rows marked removed and incomplete rows are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the formula does not exist.
    pub async fn preview(
        &self,
        owner: &OwnerId,
        formula_id: i64,
        rows: &[CompositionRow],
    ) -> Result<ExposureReport, AppError> {
        self.find_formula(owner, formula_id).await?;
        self.report(owner, rows).await
    }

    async fn report(
        &self,
        owner: &OwnerId,
        rows: &[CompositionRow],
    ) -> Result<ExposureReport, AppError> {
        let ingredient_ids: Vec<i64> = rows
            .iter()
            .filter_map(CompositionRow::active)
            .map(|(id, _)| id)
            .collect();

        let profiles = self.load_profiles(owner, &ingredient_ids).await;
        let totals = aggregate_allergens(rows, &profiles);

        let allergen_ids = totals.iter().map(|t| t.allergen_id).collect();
        let limits = self.allergens.max_concentrations(owner, allergen_ids).await?;

        let allergens = annotate_limits(totals, &limits);
        let total_exposure = allergens.iter().map(|a| a.total).sum();

        Ok(ExposureReport {
            allergens,
            total_exposure,
        })
    }

    async fn find_formula(&self, owner: &OwnerId, id: i64) -> Result<Formula, AppError> {
        self.formulas
            .find_by_id(owner, id)
            .await?
            .ok_or_else(|| AppError::not_found("Formula not found", json!({ "id": id })))
    }

    /// Loads the allergen profiles of the given ingredients.
    ///
    /// Never fails: ingredients whose profile could not be read are simply
    /// absent from the result.
    ///
    /// The cache generation of every miss is read before its fetch starts.
    /// A profile invalidated while the fetch was in flight is still returned
    /// but not cached.
    pub async fn load_profiles(&self, owner: &OwnerId, ingredient_ids: &[i64]) -> AllergenProfiles {
        let mut profiles = AllergenProfiles::new();
        let mut misses = Vec::new();
        let mut generations = HashMap::new();

        let unique: HashSet<i64> = ingredient_ids.iter().copied().collect();
        for id in unique {
            match self.cache.get_profile(owner, id).await {
                Ok(Some(profile)) => {
                    metrics::counter!("profile_cache_hits_total").increment(1);
                    profiles.insert(id, profile);
                }
                _ => {
                    match self.cache.profile_generation(owner, id).await {
                        Ok(generation) => {
                            generations.insert(id, generation);
                        }
                        Err(e) => {
                            warn!(ingredient_id = id, error = %e, "Profile cache generation unavailable, result will not be cached");
                        }
                    }
                    misses.push(id);
                }
            }
        }

        if misses.is_empty() {
            return profiles;
        }

        debug!(count = misses.len(), "Fetching allergen profiles");

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for id in misses {
            let repository = Arc::clone(&self.ingredients);
            let semaphore = Arc::clone(&semaphore);
            let owner = owner.clone();
            let strategy = ExponentialBackoff::from_millis(self.settings.retry_base_delay_ms)
                .max_delay(MAX_RETRY_DELAY)
                .take(self.settings.retries);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();

                let result = Retry::spawn(strategy, || {
                    let repository = Arc::clone(&repository);
                    let owner = owner.clone();
                    async move { repository.list_allergens(&owner, id).await }
                })
                .await;

                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(profile))) => {
                    if let Some(&generation) = generations.get(&id) {
                        self.store_profile(owner, id, &profile, generation).await;
                    }
                    profiles.insert(id, profile);
                }
                Ok((id, Err(e))) => {
                    metrics::counter!("profile_fetch_failures_total").increment(1);
                    warn!(ingredient_id = id, error = %e, "Allergen profile unavailable, treating as empty");
                }
                Err(e) => {
                    metrics::counter!("profile_fetch_failures_total").increment(1);
                    warn!(error = %e, "Allergen profile task failed");
                }
            }
        }

        profiles
    }

    async fn store_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        profile: &[AllergenShare],
        generation: u64,
    ) {
        match self
            .cache
            .set_profile(owner, ingredient_id, profile, generation, None)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                debug!(ingredient_id, generation, "Profile not cached, it changed during the fetch or caching is off");
            }
            Err(e) => {
                warn!(ingredient_id, error = %e, "Failed to cache allergen profile");
            }
        }
    }
}
