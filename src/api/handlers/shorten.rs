//! Handler for the shortening endpoint.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::HeaderMap,
};
use serde_json::json;
use tracing::debug;
use validator::Validate;

use crate::api::dto::shorten::{ShortenResponse, ShortenTarget};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_origin::request_origin;

/// Message returned for URLs that fail validation.
pub const INVALID_URL_MESSAGE: &str =
    "Format of provided URL is invalid. Remember to use an http:// or https:// prefix.";

/// Shortens the URL embedded in the request path.
///
/// # Endpoint
///
/// `GET /new/{*url}`
///
/// Everything after `/new/` plus the query string is the URL, so
/// `/new/https://example.com/search?q=rust` shortens
/// `https://example.com/search?q=rust`. Shortening the same URL again
/// returns the existing short link.
///
/// # Response
///
/// ```json
/// {
///   "original_url": "https://example.com/search?q=rust",
///   "short_url": "http://s.example.com/a"
/// }
/// ```
///
/// # Errors
///
/// - 422 if the URL is not an absolute `http(s)` URL
/// - 500 if no sequence id could be allocated or the store returned bad data
/// - 503 if the store is unreachable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<ShortenResponse>, AppError> {
    let target = ShortenTarget::from_parts(path, query);

    if let Err(e) = target.validate() {
        debug!("Rejected URL {:?}: {}", target.url, e);
        return Err(AppError::bad_request(
            INVALID_URL_MESSAGE,
            json!({ "provided_url": target.url }),
        ));
    }

    let base = short_link_base(&state, &headers)?;
    let record = state.allocator.shorten(&target.url).await?;

    Ok(Json(ShortenResponse {
        short_url: format!("{}/{}", base, record.key()),
        original_url: record.original_url,
    }))
}

fn short_link_base(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    match state.public_base_url {
        Some(ref base) => Ok(base.clone()),
        None => request_origin(headers, state.behind_proxy),
    }
}
