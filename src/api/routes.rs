//! Public route table.

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All service endpoints. None require authentication.
///
/// # Endpoints
///
/// - `GET /new/{*url}` - Shorten the URL in the rest of the path
/// - `GET /_health`    - Store and cache health
/// - `GET /{key}`      - Redirect a short key
///
/// Every single-segment path made only of base-36 digits belongs to
/// `/{key}`. `health`, `new` and the like are valid keys, so service routes
/// either contain a non-digit such as `_` or have more than one segment.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/new/{*url}", get(shorten_handler))
        .route("/_health", get(health_handler))
        .route("/{key}", get(redirect_handler))
}
