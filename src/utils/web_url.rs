//! Acceptance rules for URLs submitted for shortening.
//!
//! A URL is accepted as-is (it is never normalized) when it parses as an
//! absolute URL with an `http` or `https` scheme and a non-empty host.

use url::Url;
use validator::ValidationError;

/// Returns true if `candidate` is an absolute `http(s)` URL with a host.
pub fn is_web_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// `validator` hook for [`is_web_url`].
pub fn validate_web_url(candidate: &str) -> Result<(), ValidationError> {
    if is_web_url(candidate) {
        Ok(())
    } else {
        Err(ValidationError::new("web_url"))
    }
}
