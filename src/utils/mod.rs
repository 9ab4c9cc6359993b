//! Helpers shared by the services, handlers and the admin CLI.
//!
//! - [`key_codec`] - Base-36 encoding of sequence ids into short keys
//! - [`db_error`] - Classification of PostgreSQL errors
//! - [`request_origin`] - Scheme and host of the incoming request
//! - [`web_url`] - Acceptance check for URLs submitted for shortening

pub mod db_error;
pub mod key_codec;
pub mod request_origin;
pub mod web_url;
