//! Core domain entities.
//!
//! The service has a single persistent entity, [`UrlRecord`]. Creation input
//! uses the separate [`NewUrlRecord`] struct, following the "New Type" pattern
//! used for inserts.

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
