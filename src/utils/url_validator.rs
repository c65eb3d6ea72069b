//! Original URL validation.
//!
//! URLs are checked but never rewritten: the stored string is exactly what the
//! caller sent, so dedup compares raw strings.

use url::Url;

/// Longest original URL accepted, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons an original URL is rejected.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL exceeds {MAX_URL_LENGTH} bytes")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Validates a URL submitted for shortening.
///
/// # Rules
///
/// 1. Not empty or whitespace-only
/// 2. At most [`MAX_URL_LENGTH`] bytes
/// 3. Parses as an absolute URL with a host
/// 4. Scheme is `http` or `https`
///
/// # Errors
///
/// Returns the first [`UrlValidationError`] rule that fails.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_original_url("http://example.com").is_ok());
/// assert!(validate_original_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_original_url(input: &str) -> Result<(), UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(())
}
