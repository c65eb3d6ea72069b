//! Cache service trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching alias to URL mappings.
///
/// The cache is never authoritative. Callers treat any error as a miss and
/// fall back to the record store; see
/// [`crate::application::services::ResolutionService`].
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - Process-local cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the original URL for an alias.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot answer.
    async fn get_url(&self, alias: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping with a TTL in seconds.
    ///
    /// `None` uses the implementation default.
    async fn set_url(
        &self,
        alias: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached mapping. Used when a record is deleted.
    async fn invalidate(&self, alias: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name reported by health checks.
    fn backend_name(&self) -> &'static str;
}
