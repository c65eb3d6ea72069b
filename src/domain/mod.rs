//! Domain layer containing business entities and storage contracts.
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits defined here are implemented in
//! [`crate::infrastructure::persistence`] and consumed by
//! [`crate::application::services`].
//!
//! # Modules
//!
//! - [`entities`] - Persisted data structures
//! - [`repositories`] - Record store trait and its error type

pub mod entities;
pub mod repositories;
