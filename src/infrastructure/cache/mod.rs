//! Caching layer for ingredient allergen profiles.
//!
//! Computing a formula's exposure needs the allergen profile of every
//! ingredient in it. Profiles change rarely, so they are cached per owner
//! and ingredient.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`NullCache`] - No-op implementation for testing/disabled caching

#[cfg(test)]
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use memory_cache::MemoryCache;
#[cfg(test)]
pub use service::MockCacheService;
