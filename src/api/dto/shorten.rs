//! DTOs for the shortening endpoint.

use serde::Serialize;
use validator::Validate;

use crate::utils::web_url::validate_web_url;

/// URL captured from `/new/{*url}`, query string included.
#[derive(Debug, Validate)]
pub struct ShortenTarget {
    #[validate(url, custom(function = "validate_web_url"))]
    pub url: String,
}

impl ShortenTarget {
    /// Rebuilds the submitted URL from the captured path and raw query.
    pub fn from_parts(path: String, query: Option<String>) -> Self {
        let url = match query {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };

        Self { url }
    }
}

/// Successful shortening result.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub original_url: String,
    pub short_url: String,
}
