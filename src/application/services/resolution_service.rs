//! Alias creation, resolution, listing and deletion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde_json::json;
use tokio::time::timeout;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{StorageError, UrlRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::alias_generator::{AliasGenerator, validate_custom_alias};
use crate::utils::url_validator::validate_original_url;

/// Attempts at inserting a generated alias before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Tunables for [`ResolutionService`].
#[derive(Debug, Clone)]
pub struct ResolutionSettings {
    /// TTL written with every cache entry.
    pub cache_ttl_seconds: u64,
    pub storage_timeout: Duration,
    pub cache_timeout: Duration,
    /// First backoff delay between read retries.
    pub retry_base: Duration,
    /// Retries for idempotent reads after a transient storage error.
    pub read_retries: usize,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 3600,
            storage_timeout: Duration::from_millis(2000),
            cache_timeout: Duration::from_millis(250),
            retry_base: Duration::from_millis(20),
            read_retries: 3,
        }
    }
}

impl ResolutionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_ttl_seconds: config.cache_ttl_seconds,
            storage_timeout: Duration::from_millis(config.storage_timeout_ms),
            cache_timeout: Duration::from_millis(config.cache_timeout_ms),
            retry_base: Duration::from_millis(config.storage_retry_base_ms),
            read_retries: config.storage_read_retries,
        }
    }
}

/// Orchestrates the record store, the read-through cache and alias generation.
///
/// # Consistency
///
/// - `create` dedups by exact original URL. The store's unique constraint on
///   `original_url` settles concurrent creates: the loser returns the
///   winner's alias.
/// - `resolve` populates the cache after every store hit.
/// - `delete` evicts the cache entry after removing the record.
///
/// Cache failures and cache timeouts are logged and treated as misses.
pub struct ResolutionService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
    generator: Arc<dyn AliasGenerator>,
    settings: ResolutionSettings,
}

impl ResolutionService {
    /// Creates a new resolution service.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<dyn AliasGenerator>,
        settings: ResolutionSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            generator,
            settings,
        }
    }

    /// Returns the alias for `original_url`, creating a record if none exists.
    ///
    /// # Deduplication
    ///
    /// If a record with exactly this original URL exists, its alias is
    /// returned and `custom_alias` is ignored.
    ///
    /// # Alias Selection
    ///
    /// - If `custom_alias` is provided, validates it and fails on collision
    /// - Otherwise, generates an alias, retrying up to 5 times on collision
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom alias is invalid.
    /// Returns [`AppError::Conflict`] if the custom alias is already taken.
    /// Returns [`AppError::Internal`] on storage failure.
    pub async fn create(
        &self,
        original_url: String,
        custom_alias: Option<String>,
    ) -> Result<String, AppError> {
        validate_original_url(&original_url).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
        })?;

        if let Some(existing) = self
            .store(self.repository.find_by_original_url(&original_url))
            .await?
        {
            debug!(alias = %existing.short_alias, "URL already shortened");
            return Ok(existing.short_alias);
        }

        let record = match custom_alias {
            Some(custom) => self.insert_custom(original_url, custom).await?,
            None => self.insert_generated(original_url).await?,
        };

        Ok(record.short_alias)
    }

    /// Resolves an alias to its original URL.
    ///
    /// # Request Flow
    ///
    /// 1. Cache lookup; a hit returns immediately
    /// 2. On miss or cache error, record store lookup (retried on transient errors)
    /// 3. On store hit, asynchronous cache write with the configured TTL
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this alias.
    /// Returns [`AppError::Internal`] on storage failure.
    pub async fn resolve(&self, alias: &str) -> Result<String, AppError> {
        if let Some(url) = self.cached_url(alias).await {
            return Ok(url);
        }

        let record = self
            .read_with_retry(|| self.repository.find_by_alias(alias))
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "alias": alias })))?;

        self.populate_cache(record.short_alias.clone(), record.original_url.clone());

        Ok(record.original_url)
    }

    /// Returns every record, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage failure.
    pub async fn list(&self) -> Result<Vec<UrlRecord>, AppError> {
        Ok(self.read_with_retry(|| self.repository.find_all()).await?)
    }

    /// Deletes the record for `alias` and evicts its cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this alias.
    /// Returns [`AppError::Internal`] on storage failure.
    pub async fn delete(&self, alias: &str) -> Result<(), AppError> {
        let deleted = self.store(self.repository.delete_by_alias(alias)).await?;

        if !deleted {
            return Err(AppError::not_found(
                "Short URL not found",
                json!({ "alias": alias }),
            ));
        }

        self.evict(alias).await;
        counter!("urls_deleted_total").increment(1);
        info!(alias, "Short URL deleted");

        Ok(())
    }

    /// Checks that the record store answers.
    pub async fn store_healthy(&self) -> Result<(), StorageError> {
        self.store(self.repository.health_check()).await
    }

    /// Checks that the cache backend answers.
    pub async fn cache_healthy(&self) -> bool {
        timeout(self.settings.cache_timeout, self.cache.health_check())
            .await
            .unwrap_or(false)
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn insert_custom(
        &self,
        original_url: String,
        custom: String,
    ) -> Result<UrlRecord, AppError> {
        validate_custom_alias(&custom)?;

        let taken = || AppError::conflict("Alias is already taken", json!({ "alias": custom }));

        if self
            .store(self.repository.find_by_alias(&custom))
            .await?
            .is_some()
        {
            return Err(taken());
        }

        let new_record = NewUrlRecord {
            original_url: original_url.clone(),
            short_alias: custom.clone(),
        };

        match self.store(self.repository.insert(new_record)).await {
            Ok(record) => Ok(self.created(record)),
            Err(e) if e.is_alias_conflict() => Err(taken()),
            Err(e) if e.is_original_url_conflict() => self.existing_record(&original_url).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_generated(&self, original_url: String) -> Result<UrlRecord, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let new_record = NewUrlRecord {
                original_url: original_url.clone(),
                short_alias: self.generator.generate(),
            };
            let alias = new_record.short_alias.clone();

            match self.store(self.repository.insert(new_record)).await {
                Ok(record) => return Ok(self.created(record)),
                Err(e) if e.is_alias_conflict() => {
                    warn!(%alias, attempt, "Generated alias collided, retrying");
                }
                Err(e) if e.is_original_url_conflict() => {
                    return self.existing_record(&original_url).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal(
            "Failed to generate a unique alias",
            json!({}),
        ))
    }

    fn created(&self, record: UrlRecord) -> UrlRecord {
        counter!("urls_created_total").increment(1);
        info!(alias = %record.short_alias, "Short URL created");
        record
    }

    /// Re-reads the record that won a concurrent create for `original_url`.
    async fn existing_record(&self, original_url: &str) -> Result<UrlRecord, AppError> {
        debug!("Concurrent create for the same URL, returning existing alias");

        self.store(self.repository.find_by_original_url(original_url))
            .await?
            .ok_or_else(|| AppError::internal("Internal server error", json!({})))
    }

    async fn cached_url(&self, alias: &str) -> Option<String> {
        match timeout(self.settings.cache_timeout, self.cache.get_url(alias)).await {
            Ok(Ok(Some(url))) => {
                counter!("cache_hits_total").increment(1);
                debug!(alias, "Cache HIT");
                Some(url)
            }
            Ok(Ok(None)) => {
                counter!("cache_misses_total").increment(1);
                debug!(alias, "Cache MISS");
                None
            }
            Ok(Err(e)) => {
                counter!("cache_errors_total").increment(1);
                warn!(alias, error = %e, "Cache lookup failed, falling back to store");
                None
            }
            Err(_) => {
                counter!("cache_errors_total").increment(1);
                warn!(alias, "Cache lookup timed out, falling back to store");
                None
            }
        }
    }

    /// Writes the mapping to the cache without blocking the caller.
    ///
    /// The write may land after a `delete` of the same alias has already
    /// evicted. The record is re-read once the entry is written and the entry
    /// is dropped again when the record is gone or the store does not answer.
    fn populate_cache(&self, alias: String, original_url: String) {
        let cache = Arc::clone(&self.cache);
        let repository = Arc::clone(&self.repository);
        let ttl = self.settings.cache_ttl_seconds;
        let cache_limit = self.settings.cache_timeout;
        let storage_limit = self.settings.storage_timeout;

        tokio::spawn(async move {
            match timeout(cache_limit, cache.set_url(&alias, &original_url, Some(ttl))).await {
                Ok(Ok(())) => debug!(%alias, ttl, "Cached URL"),
                Ok(Err(e)) => {
                    warn!(%alias, error = %e, "Failed to cache URL");
                    return;
                }
                Err(_) => {
                    warn!(%alias, "Caching URL timed out");
                    return;
                }
            }

            let still_present = matches!(
                timeout(storage_limit, repository.find_by_alias(&alias)).await,
                Ok(Ok(Some(_)))
            );

            if !still_present {
                debug!(%alias, "Record gone after caching, evicting");
                match timeout(cache_limit, cache.invalidate(&alias)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(%alias, error = %e, "Failed to evict stale cache entry"),
                    Err(_) => warn!(%alias, "Evicting stale cache entry timed out"),
                }
            }
        });
    }

    async fn evict(&self, alias: &str) {
        match timeout(self.settings.cache_timeout, self.cache.invalidate(alias)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(alias, error = %e, "Failed to invalidate cache after delete"),
            Err(_) => warn!(alias, "Cache invalidation timed out after delete"),
        }
    }

    /// Bounds a record store call by the storage timeout.
    async fn store<T, F>(&self, call: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        let limit = self.settings.storage_timeout;
        timeout(limit, call)
            .await
            .unwrap_or(Err(StorageError::Timeout(limit)))
    }

    /// Runs an idempotent read, retrying transient failures with jittered backoff.
    async fn read_with_retry<T, F, Fut>(&self, mut read: F) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        // Delays are 2^n * factor ms, so the first retry waits about `retry_base`.
        let factor = (self.settings.retry_base.as_millis() as u64 / 2).max(1);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(Duration::from_secs(1))
            .map(jitter)
            .take(self.settings.read_retries);

        RetryIf::start(strategy, || self.store(read()), StorageError::is_transient).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::{CacheError, CacheResult, MockCacheService, NullCache};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator(&'static [&'static str], AtomicUsize);

    impl AliasGenerator for FixedGenerator {
        fn generate(&self) -> String {
            let i = self.1.fetch_add(1, Ordering::SeqCst);
            self.0[i % self.0.len()].to_string()
        }
    }

    fn fixed(aliases: &'static [&'static str]) -> Arc<dyn AliasGenerator> {
        Arc::new(FixedGenerator(aliases, AtomicUsize::new(0)))
    }

    fn test_record(id: i64, alias: &str, url: &str) -> UrlRecord {
        UrlRecord::new(id, url.to_string(), alias.to_string(), 0, Utc::now())
    }

    fn fast_settings() -> ResolutionSettings {
        ResolutionSettings {
            retry_base: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn service(repo: MockUrlRepository, generator: Arc<dyn AliasGenerator>) -> ResolutionService {
        ResolutionService::new(
            Arc::new(repo),
            Arc::new(NullCache::new()),
            generator,
            fast_settings(),
        )
    }

    #[tokio::test]
    async fn test_create_generates_alias() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|r| r.short_alias == "abc123" && r.original_url == "http://example.com")
            .times(1)
            .returning(|r| Ok(test_record(1, &r.short_alias, &r.original_url)));

        let service = service(repo, fixed(&["abc123"]));

        let alias = service
            .create("http://example.com".to_string(), None)
            .await
            .unwrap();
        assert_eq!(alias, "abc123");
    }

    #[tokio::test]
    async fn test_create_returns_existing_alias() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(Some(test_record(5, "custom1", "http://example.com"))));
        repo.expect_insert().times(0);

        let service = service(repo, fixed(&["unused"]));

        let alias = service
            .create("http://example.com".to_string(), Some("other".to_string()))
            .await
            .unwrap();
        assert_eq!(alias, "custom1");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url() {
        let repo = MockUrlRepository::new();
        let service = service(repo, fixed(&["unused"]));

        for input in ["", "not-a-url", "ftp://example.com/file"] {
            let err = service.create(input.to_string(), None).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{input}");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_custom_alias() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let service = service(repo, fixed(&["unused"]));

        let err = service
            .create("http://example.com".to_string(), Some("a/b".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_alias_taken() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_find_by_alias()
            .withf(|alias| alias == "taken1")
            .times(1)
            .returning(|_| Ok(Some(test_record(2, "taken1", "http://other.com"))));
        repo.expect_insert().times(0);

        let service = service(repo, fixed(&["unused"]));

        let err = service
            .create("http://example.com".to_string(), Some("taken1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_alias_lost_race_is_conflict() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_find_by_alias().times(1).returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(StorageError::alias_conflict()));

        let service = service(repo, fixed(&["unused"]));

        let err = service
            .create("http://example.com".to_string(), Some("racy1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_retries_generated_collisions() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(3)
            .returning(|r| match r.short_alias.as_str() {
                "fresh1" => Ok(test_record(9, "fresh1", &r.original_url)),
                _ => Err(StorageError::alias_conflict()),
            });

        let service = service(repo, fixed(&["dup1", "dup2", "fresh1"]));

        let alias = service
            .create("http://example.com".to_string(), None)
            .await
            .unwrap();
        assert_eq!(alias, "fresh1");
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|_| Err(StorageError::alias_conflict()));

        let service = service(repo, fixed(&["dup"]));

        let err = service
            .create("http://example.com".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_concurrent_original_url_returns_winner() {
        let mut repo = MockUrlRepository::new();
        let lookups = Arc::new(AtomicUsize::new(0));
        let seen = lookups.clone();
        repo.expect_find_by_original_url()
            .times(2)
            .returning(move |url| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(None)
                } else {
                    Ok(Some(test_record(3, "winner", url)))
                }
            });
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(StorageError::original_url_conflict()));

        let service = service(repo, fixed(&["loser"]));

        let alias = service
            .create("http://example.com".to_string(), None)
            .await
            .unwrap();
        assert_eq!(alias, "winner");
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_does_not_retry_writes() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(StorageError::Unavailable("connection reset".into())));

        let service = service(repo, fixed(&["abc123"]));

        let err = service
            .create("http://example.com".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_resolve_unknown_alias_is_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_alias().times(1).returning(|_| Ok(None));

        let service = service(repo, fixed(&["unused"]));

        let err = service.resolve("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_retries_transient_errors() {
        let mut repo = MockUrlRepository::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        repo.expect_find_by_alias().times(2..=3).returning(move |alias| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(StorageError::Unavailable("pool timed out".into()))
            } else {
                Ok(Some(test_record(1, alias, "http://example.com")))
            }
        });

        let service = service(repo, fixed(&["unused"]));

        let url = service.resolve("abc123").await.unwrap();
        assert_eq!(url, "http://example.com");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_does_not_retry_permanent_errors() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_alias()
            .times(1)
            .returning(|_| Err(StorageError::Database("relation does not exist".into())));

        let service = service(repo, fixed(&["unused"]));

        let err = service.resolve("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_resolve_cache_hit_skips_store() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_alias().times(0);

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .withf(|alias| alias == "abc123")
            .times(1)
            .returning(|_| Ok(Some("http://cached.example.com".to_string())));

        let service = ResolutionService::new(
            Arc::new(repo),
            Arc::new(cache),
            fixed(&["unused"]),
            fast_settings(),
        );

        assert_eq!(
            service.resolve("abc123").await.unwrap(),
            "http://cached.example.com"
        );
    }

    #[tokio::test]
    async fn test_resolve_cache_error_falls_back_to_store() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_alias()
            .times(1..=2)
            .returning(|alias| Ok(Some(test_record(1, alias, "http://example.com"))));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .times(1)
            .returning(|_| Err(CacheError::ConnectionError("connection refused".into())));
        cache.expect_set_url().returning(|_, _, _| Ok(()));

        let service = ResolutionService::new(
            Arc::new(repo),
            Arc::new(cache),
            fixed(&["unused"]),
            fast_settings(),
        );

        assert_eq!(service.resolve("abc123").await.unwrap(), "http://example.com");
    }

    #[tokio::test]
    async fn test_delete_missing_alias_is_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_delete_by_alias()
            .times(1)
            .returning(|_| Ok(false));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate().times(0);

        let service = ResolutionService::new(
            Arc::new(repo),
            Arc::new(cache),
            fixed(&["unused"]),
            fast_settings(),
        );

        let err = service.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_evicts_cache_even_when_cache_fails() {
        let mut repo = MockUrlRepository::new();
        repo.expect_delete_by_alias()
            .withf(|alias| alias == "abc123")
            .times(1)
            .returning(|_| Ok(true));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate()
            .withf(|alias| alias == "abc123")
            .times(1)
            .returning(|_| Err(CacheError::OperationError("READONLY".into())));

        let service = ResolutionService::new(
            Arc::new(repo),
            Arc::new(cache),
            fixed(&["unused"]),
            fast_settings(),
        );

        assert!(service.delete("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_returns_records() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_all().times(1).returning(|| {
            Ok(vec![test_record(1, "abc123", "http://example.com")])
        });

        let service = service(repo, fixed(&["unused"]));

        let records = service.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].short_alias, "abc123");
    }

    #[tokio::test]
    async fn test_concurrent_creates_share_one_alias() {
        use crate::infrastructure::persistence::InMemoryUrlRepository;
        use crate::utils::alias_generator::RandomAliasGenerator;

        let service = Arc::new(ResolutionService::new(
            Arc::new(InMemoryUrlRepository::new()),
            Arc::new(NullCache::new()),
            Arc::new(RandomAliasGenerator),
            fast_settings(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .create("https://example.com/race".to_string(), None)
                        .await
                })
            })
            .collect();

        let mut aliases = Vec::new();
        for handle in handles {
            aliases.push(handle.await.unwrap().unwrap());
        }

        aliases.dedup();
        assert_eq!(aliases.len(), 1);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_right_after_resolve_leaves_no_stale_entry() {
        use crate::infrastructure::cache::MemoryCache;
        use crate::infrastructure::persistence::InMemoryUrlRepository;

        let cache = Arc::new(MemoryCache::new(100, 3600));
        let service = ResolutionService::new(
            Arc::new(InMemoryUrlRepository::new()),
            cache.clone(),
            fixed(&["unused"]),
            fast_settings(),
        );

        service
            .create("https://example.com/gone".to_string(), Some("gone1".to_string()))
            .await
            .unwrap();

        assert_eq!(
            service.resolve("gone1").await.unwrap(),
            "https://example.com/gone"
        );
        service.delete("gone1").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get_url("gone1").await.unwrap(), None);
        let err = service.resolve("gone1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    const HANG: Duration = Duration::from_secs(3600);

    /// Record store whose alias lookups and inserts take `delay`.
    struct SlowRepository {
        delay: Duration,
        record: Option<UrlRecord>,
        lookups: AtomicUsize,
        inserts: AtomicUsize,
    }

    impl SlowRepository {
        fn new(delay: Duration, record: Option<UrlRecord>) -> Self {
            Self {
                delay,
                record,
                lookups: AtomicUsize::new(0),
                inserts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl UrlRepository for SlowRepository {
        async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StorageError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(test_record(1, &new_record.short_alias, &new_record.original_url))
        }

        async fn find_by_alias(&self, _alias: &str) -> Result<Option<UrlRecord>, StorageError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.record.clone())
        }

        async fn find_by_original_url(
            &self,
            _original_url: &str,
        ) -> Result<Option<UrlRecord>, StorageError> {
            Ok(None)
        }

        async fn find_all(&self) -> Result<Vec<UrlRecord>, StorageError> {
            Ok(Vec::new())
        }

        async fn delete_by_alias(&self, _alias: &str) -> Result<bool, StorageError> {
            Ok(false)
        }

        async fn health_check(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Cache whose lookups never answer in time.
    struct HangingCache;

    #[async_trait::async_trait]
    impl CacheService for HangingCache {
        async fn get_url(&self, _alias: &str) -> CacheResult<Option<String>> {
            tokio::time::sleep(HANG).await;
            Ok(None)
        }

        async fn set_url(
            &self,
            _alias: &str,
            _original_url: &str,
            _ttl_seconds: Option<u64>,
        ) -> CacheResult<()> {
            Ok(())
        }

        async fn invalidate(&self, _alias: &str) -> CacheResult<()> {
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn backend_name(&self) -> &'static str {
            "hanging"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_call_times_out() {
        let service = service(MockUrlRepository::new(), fixed(&["unused"]));

        let result = service
            .store(std::future::pending::<Result<(), StorageError>>())
            .await;

        match result {
            Err(StorageError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(2000)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_hanging_cache_falls_back_to_store() {
        let repo = SlowRepository::new(
            Duration::ZERO,
            Some(test_record(1, "abc123", "http://example.com")),
        );

        let service = ResolutionService::new(
            Arc::new(repo),
            Arc::new(HangingCache),
            fixed(&["unused"]),
            fast_settings(),
        );

        assert_eq!(service.resolve("abc123").await.unwrap(), "http://example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_hanging_store_retries_then_fails() {
        let repo = Arc::new(SlowRepository::new(HANG, None));

        let service = ResolutionService::new(
            repo.clone(),
            Arc::new(NullCache::new()),
            fixed(&["unused"]),
            fast_settings(),
        );

        let err = service.resolve("abc123").await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 1 + fast_settings().read_retries);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_hanging_insert_is_not_retried() {
        let repo = Arc::new(SlowRepository::new(HANG, None));

        let service = ResolutionService::new(
            repo.clone(),
            Arc::new(NullCache::new()),
            fixed(&["abc123"]),
            fast_settings(),
        );

        let err = service
            .create("http://example.com".to_string(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(repo.inserts.load(Ordering::SeqCst), 1);
    }
}
