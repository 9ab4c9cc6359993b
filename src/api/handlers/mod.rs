//! HTTP request handlers.
//!
//! Each handler module corresponds to one endpoint.

pub mod health;
pub mod index;
pub mod redirect;
pub mod shorten;

pub use health::health_handler;
pub use index::index_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
