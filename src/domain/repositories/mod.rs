//! Repository trait definitions for the domain layer.
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Record store for alias mappings
//!
//! # Testing
//!
//! See integration tests in `tests/repository_url.rs` for usage examples.

pub mod error;
pub mod url_repository;

pub use error::{ALIAS_CONSTRAINT, ORIGINAL_URL_CONSTRAINT, StorageError};
pub use url_repository::UrlRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;
