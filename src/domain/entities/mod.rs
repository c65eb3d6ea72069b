//! Core domain entities.
//!
//! - [`UrlRecord`] - A persisted alias to original URL mapping
//! - [`NewUrlRecord`] - Input for inserting a new mapping

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
