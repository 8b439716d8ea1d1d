//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::composition::AllergenShare;
use crate::domain::entities::OwnerId;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching ingredient allergen profiles.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the application (cache failures should degrade to database lookups).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached allergen profile of an ingredient.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(profile))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
    ) -> CacheResult<Option<Vec<AllergenShare>>>;

    /// Current generation of an ingredient's cached profile.
    ///
    /// Read it before fetching a profile from the database and hand it back
    /// to [`CacheService::set_profile`]. Unknown ingredients are at
    /// generation `0`.
    async fn profile_generation(&self, owner: &OwnerId, ingredient_id: i64) -> CacheResult<u64>;

    /// Stores an allergen profile with optional TTL.
    ///
    /// The write only happens while the profile is still at `generation`.
    /// A profile invalidated after `generation` was read is stale and is
    /// dropped. `ttl_seconds = None` uses the implementation's default.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` when the profile was stored
    /// - `Ok(false)` when it was dropped as stale or caching is disabled
    async fn set_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        profile: &[AllergenShare],
        generation: u64,
        ttl_seconds: Option<usize>,
    ) -> CacheResult<bool>;

    /// Removes a cached profile and advances its generation.
    ///
    /// Used whenever an ingredient's allergen links change, or an allergen it
    /// contains is renamed.
    async fn invalidate_profile(&self, owner: &OwnerId, ingredient_id: i64) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;
}
