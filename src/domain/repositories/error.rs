//! Record store error type.

use std::time::Duration;
use thiserror::Error;

/// Unique constraint guarding `short_alias`.
pub const ALIAS_CONSTRAINT: &str = "urls_short_alias_key";

/// Unique constraint guarding `original_url`.
pub const ORIGINAL_URL_CONSTRAINT: &str = "urls_original_url_key";

/// Errors returned by [`super::UrlRepository`] implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violation ({constraint:?})")]
    Conflict { constraint: Option<String> },

    /// The backend could not be reached (pool exhausted, I/O failure).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout.
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    /// Returns true for failures worth retrying on idempotent reads.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }

    /// Returns true if the write collided with an existing alias.
    pub fn is_alias_conflict(&self) -> bool {
        matches!(self, Self::Conflict { constraint: Some(c) } if c == ALIAS_CONSTRAINT)
    }

    /// Returns true if the write collided with an existing original URL.
    pub fn is_original_url_conflict(&self) -> bool {
        matches!(self, Self::Conflict { constraint: Some(c) } if c == ORIGINAL_URL_CONSTRAINT)
    }

    pub(crate) fn alias_conflict() -> Self {
        Self::Conflict {
            constraint: Some(ALIAS_CONSTRAINT.to_string()),
        }
    }

    pub(crate) fn original_url_conflict() -> Self {
        Self::Conflict {
            constraint: Some(ORIGINAL_URL_CONSTRAINT.to_string()),
        }
    }
}
