//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::composition::AllergenShare;
use crate::domain::entities::OwnerId;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Stores `ARGV[2]` under `KEYS[1]` only while the generation counter at
/// `KEYS[2]` still reads `ARGV[1]`. A missing counter reads as `0`.
const SET_IF_GENERATION: &str = r"
local current = redis.call('GET', KEYS[2]) or '0'
if current ~= ARGV[1] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
return 1
";

/// Redis cache for ingredient allergen profiles.
///
/// Profiles are stored as JSON strings under `profile:<owner>:<ingredient>`,
/// next to a generation counter under `profile-gen:<owner>:<ingredient>`.
/// Invalidation bumps the counter, and a write carrying an older generation
/// is refused by a server-side script.
///
/// Reads are fail-open: errors are logged and behave like a miss. Failed
/// writes and invalidations are reported to the caller.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: usize,
    key_prefix: String,
    set_script: Script,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied when [`CacheService::set_profile`]
    ///   is called with `ttl_seconds = None`; controlled via `CACHE_TTL_SECONDS` env var
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds as usize,
            key_prefix: "profile".to_string(),
            set_script: Script::new(SET_IF_GENERATION),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, owner: &OwnerId, ingredient_id: i64) -> String {
        format!("{}:{}:{}", self.key_prefix, owner, ingredient_id)
    }

    fn build_generation_key(&self, owner: &OwnerId, ingredient_id: i64) -> String {
        format!("{}-gen:{}:{}", self.key_prefix, owner, ingredient_id)
    }

    /// Generation counters outlive the profiles they guard so that a slow
    /// fetch cannot see a counter reset to `0`.
    fn generation_ttl(&self) -> usize {
        self.default_ttl.saturating_mul(2).max(60)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
    ) -> CacheResult<Option<Vec<AllergenShare>>> {
        let key = self.build_key(owner, ingredient_id);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(profile) => {
                    debug!("Cache HIT: {}", key);
                    Ok(Some(profile))
                }
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn profile_generation(&self, owner: &OwnerId, ingredient_id: i64) -> CacheResult<u64> {
        let key = self.build_generation_key(owner, ingredient_id);
        let mut conn = self.client.clone();

        conn.get::<_, Option<u64>>(&key)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| CacheError::OperationError(format!("Redis GET {} failed: {}", key, e)))
    }

    async fn set_profile(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        profile: &[AllergenShare],
        generation: u64,
        ttl: Option<usize>,
    ) -> CacheResult<bool> {
        let key = self.build_key(owner, ingredient_id);
        let generation_key = self.build_generation_key(owner, ingredient_id);
        let ttl_seconds = ttl.unwrap_or(self.default_ttl);

        let json = serde_json::to_string(profile).map_err(|e| {
            CacheError::OperationError(format!("Could not serialize profile for {}: {}", key, e))
        })?;

        let mut conn = self.client.clone();
        let stored: i32 = self
            .set_script
            .key(&key)
            .key(&generation_key)
            .arg(generation)
            .arg(json)
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis SET {} failed: {}", key, e)))?;

        if stored == 1 {
            debug!(
                "Cache SET: {} ({} allergens, TTL: {}s)",
                key,
                profile.len(),
                ttl_seconds
            );
            Ok(true)
        } else {
            debug!("Cache SET skipped, {} changed since generation {}", key, generation);
            Ok(false)
        }
    }

    async fn invalidate_profile(&self, owner: &OwnerId, ingredient_id: i64) -> CacheResult<()> {
        let key = self.build_key(owner, ingredient_id);
        let generation_key = self.build_generation_key(owner, ingredient_id);
        let mut conn = self.client.clone();

        let result: redis::RedisResult<()> = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(&generation_key)
            .ignore()
            .cmd("EXPIRE")
            .arg(&generation_key)
            .arg(self.generation_ttl())
            .ignore()
            .cmd("DEL")
            .arg(&key)
            .ignore()
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                debug!("Cache INVALIDATE: {}", key);
                Ok(())
            }
            Err(e) => Err(CacheError::OperationError(format!(
                "Redis invalidation of {} failed: {}",
                key, e
            ))),
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
