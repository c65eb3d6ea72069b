//! In-process cache implementation using Moka.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Cached value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL given to `set_url`, restarting the
/// clock when the entry is overwritten.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local cache for single-node deployments and tests.
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, CachedUrl>,
    default_ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, alias: &str) -> CacheResult<Option<String>> {
        let cached = self.cache.get(alias).await.map(|entry| entry.original_url);
        trace!(alias, hit = cached.is_some(), "Memory cache lookup");
        Ok(cached)
    }

    async fn set_url(
        &self,
        alias: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let ttl = ttl_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);

        self.cache
            .insert(
                alias.to_string(),
                CachedUrl {
                    original_url: original_url.to_string(),
                    ttl,
                },
            )
            .await;
        debug!(alias, ttl_seconds = ttl.as_secs(), "Memory cache SET");
        Ok(())
    }

    async fn invalidate(&self, alias: &str) -> CacheResult<()> {
        self.cache.invalidate(alias).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
