//! DTOs for the record listing endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::UrlRecord;

/// One record in the listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub original_url: String,
    pub shortened_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UrlRecord> for UrlResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            original_url: record.original_url,
            shortened_url: record.short_alias,
            clicks: record.click_count,
            created_at: record.created_at,
        }
    }
}
