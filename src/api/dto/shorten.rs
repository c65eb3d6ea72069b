//! DTOs for the shortening endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Characters accepted in a custom alias.
static CUSTOM_ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias pattern is valid"));

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The original URL to shorten. Scheme and host are checked by the service.
    pub long_url: String,

    /// Optional caller-chosen alias.
    #[validate(length(min = 3, max = 32, message = "Custom alias must be 3-32 characters"))]
    #[validate(regex(
        path = "*CUSTOM_ALIAS_REGEX",
        message = "Custom alias can only contain letters, digits, hyphens and underscores"
    ))]
    pub custom_alias: Option<String>,
}

/// Response carrying the alias of the created or existing record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub shortened_url: String,
}
