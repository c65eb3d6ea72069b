//! URL record entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A persisted mapping from a short alias to the original URL.
///
/// `original_url` and `short_alias` never change once the record exists.
/// `click_count` is kept for the persisted shape and is not incremented by
/// any operation of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: i64,
    pub original_url: String,
    pub short_alias: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        original_url: String,
        short_alias: String,
        click_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_url,
            short_alias,
            click_count,
            created_at,
        }
    }
}

/// Input data for inserting a new record.
///
/// The store assigns `id`, sets `click_count` to 0 and `created_at` to now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub short_alias: String,
}
