//! Repository trait for URL record data access.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::StorageError;
use async_trait::async_trait;

/// Record store for alias to original URL mappings.
///
/// Implementations must enforce uniqueness of both `short_alias` and
/// `original_url` at the storage layer, reporting violations as
/// [`StorageError::Conflict`] with the constraint name.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - Process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new record with `clicks = 0` and `created_at = now`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if the alias or the original URL is
    /// already stored.
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StorageError>;

    /// Finds a record by its short alias.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlRecord>, StorageError>;

    /// Finds a record whose original URL is exactly `original_url`.
    ///
    /// No normalization is applied: trailing slashes, casing and query order
    /// all distinguish URLs.
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>, StorageError>;

    /// Returns every record, newest first.
    async fn find_all(&self) -> Result<Vec<UrlRecord>, StorageError>;

    /// Deletes the record for `alias`.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if none matched.
    async fn delete_by_alias(&self, alias: &str) -> Result<bool, StorageError>;

    /// Checks that the backend answers queries.
    async fn health_check(&self) -> Result<(), StorageError>;
}
