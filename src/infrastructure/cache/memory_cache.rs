//! In-process cache used by unit tests that need real cache behavior.

use std::collections::HashMap;
use std::sync::Mutex;

use super::service::{CacheResult, CacheService};
use crate::domain::composition::AllergenShare;
use crate::domain::entities::OwnerId;
use async_trait::async_trait;

type Key = (String, i64);

/// Follows the same generation rules as the Redis cache, without a TTL.
#[derive(Default)]
pub struct MemoryCache {
    profiles: Mutex<HashMap<Key, Vec<AllergenShare>>>,
    generations: Mutex<HashMap<Key, u64>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(owner: &OwnerId, ingredient_id: i64) -> Key {
        (owner.to_string(), ingredient_id)
    }

    /// Synchronous form of [`CacheService::invalidate_profile`], callable
    /// from inside mocked repository closures.
    pub fn invalidate(&self, owner: &OwnerId, ingredient_id: i64) {
        let key = Self::key(owner, ingredient_id);
        *self
            .generations
            .lock()
            .expect("generation lock")
            .entry(key.clone())
            .or_default() += 1;
        self.profiles.lock().expect("profile lock").remove(&key);
    }

    pub fn cached(&self, owner: &OwnerId, ingredient_id: i64) -> Option<Vec<AllergenShare>> {
        self.profiles
            .lock()
            .expect("profile lock")
            .get(&Self::key(owner, ingredient_id))
            .cloned()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
    ) -> CacheResult<Option<Vec<AllergenShare>>> {
        Ok(self.cached(owner, ingredient_id))
    }

    async fn profile_generation(&self, owner: &OwnerId, ingredient_id: i64) -> CacheResult<u64> {
        let generations = self.generations.lock().expect("generation lock");
        Ok(generations
            .get(&Self::key(owner, ingredient_id))
            .copied()
            .unwrap_or_default())
    }

    async fn set_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        profile: &[AllergenShare],
        generation: u64,
        _ttl: Option<usize>,
    ) -> CacheResult<bool> {
        let key = Self::key(owner, ingredient_id);
        let generations = self.generations.lock().expect("generation lock");
        if generations.get(&key).copied().unwrap_or_default() != generation {
            return Ok(false);
        }
        self.profiles
            .lock()
            .expect("profile lock")
            .insert(key, profile.to_vec());
        Ok(true)
    }

    async fn invalidate_profile(&self, owner: &OwnerId, ingredient_id: i64) -> CacheResult<()> {
        self.invalidate(owner, ingredient_id);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Vec<AllergenShare> {
        vec![AllergenShare {
            allergen_id: 1,
            allergen_name: "Limonene".to_string(),
            concentration: 0.25,
        }]
    }

    #[tokio::test]
    async fn test_write_with_current_generation_is_stored() {
        let cache = MemoryCache::new();
        let owner = OwnerId::default();

        let generation = cache.profile_generation(&owner, 1).await.unwrap();
        assert!(cache.set_profile(&owner, 1, &profile(), generation, None).await.unwrap());

        assert_eq!(cache.get_profile(&owner, 1).await.unwrap(), Some(profile()));
    }

    #[tokio::test]
    async fn test_write_after_invalidation_is_dropped() {
        let cache = MemoryCache::new();
        let owner = OwnerId::default();

        let generation = cache.profile_generation(&owner, 1).await.unwrap();
        cache.invalidate_profile(&owner, 1).await.unwrap();

        assert!(!cache.set_profile(&owner, 1, &profile(), generation, None).await.unwrap());
        assert_eq!(cache.get_profile(&owner, 1).await.unwrap(), None);
        assert_eq!(cache.profile_generation(&owner, 1).await.unwrap(), generation + 1);
    }
}
