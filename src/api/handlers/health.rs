//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;
use crate::utils::key_codec;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /_health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Connected, latest key: 2n9c" },
///     "cache": { "status": "ok", "message": "redis connected" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state).await;
    let cache_check = check_cache(&state).await;

    let all_healthy = store_check.is_ok() && cache_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store: store_check,
            cache: cache_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks the store by reading the highest assigned sequence id.
async fn check_store(state: &AppState) -> CheckStatus {
    match state.repository.find_max_sequence_id().await {
        Ok(Some(max)) => CheckStatus::ok(format!(
            "Connected, latest key: {}",
            key_codec::encode(max)
        )),
        Ok(None) => CheckStatus::ok("Connected, no URLs yet"),
        Err(e) => CheckStatus::error(format!("Store error: {}", e)),
    }
}

/// Checks cache connectivity. A disabled cache is always healthy.
async fn check_cache(state: &AppState) -> CheckStatus {
    match (state.cache.backend(), state.cache.health_check().await) {
        ("disabled", _) => CheckStatus::ok("Caching disabled"),
        (backend, true) => CheckStatus::ok(format!("{} connected", backend)),
        (backend, false) => CheckStatus::error(format!("{} connection failed", backend)),
    }
}
