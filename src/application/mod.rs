//! Application layer services implementing business logic.
//!
//! This layer orchestrates the record store, the read-through cache and alias
//! generation. HTTP handlers and the admin tooling call into it rather than
//! touching repositories directly.
//!
//! # Available Services
//!
//! - [`services::resolution_service::ResolutionService`] - Alias creation, resolution, listing and deletion

pub mod services;
