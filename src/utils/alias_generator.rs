//! Short alias generation and validation.
//!
//! Generated aliases come from the OS random number generator encoded as
//! URL-safe base64. Caller-supplied aliases must pass
//! [`validate_custom_alias`] before they reach the record store.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of random bytes before base64 encoding.
const ALIAS_LENGTH_BYTES: usize = 9;

/// Shortest custom alias accepted.
pub const MIN_CUSTOM_ALIAS_LENGTH: usize = 3;

/// Longest custom alias accepted.
pub const MAX_CUSTOM_ALIAS_LENGTH: usize = 32;

/// Aliases that would shadow API routes.
const RESERVED_ALIASES: &[&str] = &["urls", "shorten", "health", "api", "v1"];

/// Source of fresh aliases for the resolution service.
///
/// Implementations are pure: they never consult storage. Uniqueness is
/// enforced by the record store and collisions are retried by the caller.
pub trait AliasGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Production generator backed by [`generate_alias`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAliasGenerator;

impl AliasGenerator for RandomAliasGenerator {
    fn generate(&self) -> String {
        generate_alias()
    }
}

/// Generates a cryptographically secure random alias.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing a 12-character alias.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
///
/// # Examples
///
/// ```ignore
/// let alias = generate_alias();
/// assert_eq!(alias.len(), 12);
/// assert!(alias.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_alias() -> String {
    let mut buffer = [0u8; ALIAS_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Validates a caller-supplied alias.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route name (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_alias("custom1").is_ok());
/// assert!(validate_custom_alias("my_link-2024").is_ok());
///
/// assert!(validate_custom_alias("").is_err());          // Empty
/// assert!(validate_custom_alias("a/b").is_err());       // Path separator
/// assert!(validate_custom_alias("urls").is_err());      // Reserved
/// ```
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.len() < MIN_CUSTOM_ALIAS_LENGTH || alias.len() > MAX_CUSTOM_ALIAS_LENGTH {
        return Err(AppError::bad_request(
            "Custom alias must be 3-32 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom alias can only contain letters, digits, hyphens and underscores",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
