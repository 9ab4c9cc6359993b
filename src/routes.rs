//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /new/{*url}` - Shorten a URL
//! - `GET /_health`    - Health check: store and cache
//! - `GET /{key}`      - Short key redirect
//! - anything else     - Usage page
//!
//! Paths are matched as sent. There is no trailing-slash normalization, since
//! `/new/https://example.com/` and `/new/https://example.com` are different
//! URLs.

use crate::api;
use crate::api::handlers::index_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    api::routes::public_routes()
        .fallback(index_handler)
        .with_state(state)
        .layer(tracing::layer())
}
