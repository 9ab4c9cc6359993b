//! Usage page served for every unrouted path.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::HeaderMap, response::IntoResponse};

use crate::state::AppState;
use crate::utils::request_origin::request_origin;

/// Template for the usage page.
///
/// Renders `templates/index.html` with example links built from `origin`.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {
    origin: String,
}

/// Renders usage instructions.
///
/// # Endpoint
///
/// Router fallback (`/`, unknown multi-segment paths, `/new/` without a URL).
pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let origin = match state.public_base_url {
        Some(ref base) => base.clone(),
        None => request_origin(&headers, state.behind_proxy)
            .unwrap_or_else(|_| "http://localhost".to_string()),
    };

    IndexTemplate { origin }
}
