//! Utility functions for alias handling, URL checks and storage errors.
//!
//! - [`alias_generator`] - Alias generation and custom alias validation
//! - [`url_validator`] - Original URL validation
//! - [`db_error`] - SQLx error classification

pub mod alias_generator;
pub mod db_error;
pub mod url_validator;
