//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::composition::AllergenShare;
use crate::domain::entities::OwnerId;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when Redis is unavailable or caching is explicitly disabled.
/// All operations succeed immediately without storing or retrieving data.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Testing scenarios where caching should be bypassed
/// - Fallback when Redis connection fails at startup
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_profile(
        &self,
        _owner: &OwnerId,
        _ingredient_id: i64,
    ) -> CacheResult<Option<Vec<AllergenShare>>> {
        Ok(None)
    }

    async fn profile_generation(&self, _owner: &OwnerId, _ingredient_id: i64) -> CacheResult<u64> {
        Ok(0)
    }

    async fn set_profile(
        &self,
        _owner: &OwnerId,
        _ingredient_id: i64,
        _profile: &[AllergenShare],
        _generation: u64,
        _ttl: Option<usize>,
    ) -> CacheResult<bool> {
        Ok(false)
    }

    async fn invalidate_profile(&self, _owner: &OwnerId, _ingredient_id: i64) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
