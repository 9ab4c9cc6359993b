//! Handler for short key redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::key_codec;

/// Redirects a short key to its original URL.
///
/// # Endpoint
///
/// `GET /{key}`
///
/// # Request Flow
///
/// 1. Canonicalize the key (keys are case-insensitive)
/// 2. Check cache under the canonical key
/// 3. On cache miss, resolve through the store
/// 4. Asynchronously populate the cache
/// 5. Return 302 Found
///
/// Records never change, so a cached entry is always current. Cache errors
/// fall back to the store.
///
/// # Errors
///
/// Returns 404 Not Found if the key is not base-36 or is not assigned.
pub async fn redirect_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let Some(cache_key) = key_codec::canonicalize(&key) else {
        debug!("Key {:?} is not base-36", key);
        return Err(AppError::key_not_found());
    };

    let original_url = match state.cache.get_url(&cache_key).await {
        Ok(Some(cached_url)) => {
            debug!("Cache HIT for {}", cache_key);
            cached_url
        }
        Ok(None) => {
            debug!("Cache MISS for {}", cache_key);

            let record = state.resolver.resolve(&cache_key).await?;

            // Fire-and-forget cache write
            let cache = state.cache.clone();
            let url = record.original_url.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.set_url(&cache_key, &url, None).await {
                    error!("Failed to cache URL: {}", e);
                }
            });

            record.original_url
        }
        Err(e) => {
            error!("Cache error: {}", e);

            state.resolver.resolve(&cache_key).await?.original_url
        }
    };

    found(&original_url)
}

/// `302 Found` with a `Location` header.
///
/// `axum::response::Redirect` only offers 303, 307 and 308. URLs holding
/// characters a header cannot carry (e.g. non-ASCII path segments) are sent
/// in their percent-encoded form.
fn found(location: &str) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(location)
        .ok()
        .or_else(|| {
            let encoded = url::Url::parse(location).ok()?;
            HeaderValue::from_str(encoded.as_str()).ok()
        })
        .ok_or_else(|| {
            AppError::internal(
                "Stored URL cannot be sent as a redirect",
                serde_json::json!({ "original_url": location }),
            )
        })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}
