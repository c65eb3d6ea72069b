//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Cache backends (Redis, Moka and no-op)
//! - [`persistence`] - Record store backends (PostgreSQL and in-memory)

pub mod cache;
pub mod persistence;
