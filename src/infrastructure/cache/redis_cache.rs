//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis cache implementation for fast alias lookups.
///
/// Uses `ConnectionManager` for automatic reconnection and connection reuse.
/// Errors are returned to the caller, which downgrades them to misses.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied when [`CacheService::set_url`]
    ///   is called with `ttl_seconds = None`
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

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "url:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, alias: &str) -> String {
        format!("{}{}", self.key_prefix, alias)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, alias: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(alias);
        let mut conn = self.client.clone();

        let cached = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", key, e)))?;

        match &cached {
            Some(_) => debug!(alias, "Redis HIT"),
            None => debug!(alias, "Redis MISS"),
        }

        Ok(cached)
    }

    async fn set_url(
        &self,
        alias: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = self.build_key(alias);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl_seconds.unwrap_or(self.default_ttl);

        conn.set_ex::<_, _, ()>(&key, original_url, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", key, e)))?;

        debug!(alias, ttl_seconds, "Redis SET");
        Ok(())
    }

    async fn invalidate(&self, alias: &str) -> CacheResult<()> {
        let key = self.build_key(alias);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", key, e)))?;

        if deleted > 0 {
            debug!(alias, "Redis INVALIDATE");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
