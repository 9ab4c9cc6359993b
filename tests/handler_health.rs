mod common;

use axum::http::StatusCode;
use std::sync::Arc;

use seq_shortener::infrastructure::cache::NullCache;
use seq_shortener::state::AppState;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _repo) = common::create_test_state();
    let server = common::create_test_server(state);

    let response = server.get("/_health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["store"]["message"], "Connected, no URLs yet");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "Caching disabled");
}

#[tokio::test]
async fn test_health_reports_latest_key() {
    let (state, repo) = common::create_test_state();
    let server = common::create_test_server(state);

    common::insert_record(&repo, "https://example.com", 35).await;

    let json = server.get("/_health").await.json::<serde_json::Value>();

    assert_eq!(json["checks"]["store"]["message"], "Connected, latest key: z");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (state, _repo) = common::create_test_state();
    let server = common::create_test_server(state);

    let json = server.get("/_health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("cache").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_store_down() {
    let state = AppState::new(
        Arc::new(common::UnavailableRepository),
        Arc::new(NullCache),
        8,
    );
    let server = common::create_test_server(state);

    let response = server.get("/_health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "error");
}

#[tokio::test]
async fn test_health_degraded_when_cache_down() {
    let (_, repo) = common::create_test_state();
    let state = AppState::new(repo, Arc::new(common::RecordingCache::failing()), 8);
    let server = common::create_test_server(state);

    let response = server.get("/_health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "error");
    assert_eq!(json["checks"]["cache"]["message"], "recording connection failed");
}
