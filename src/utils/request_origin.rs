//! Origin (scheme and authority) of an incoming request.

use crate::AppError;
use axum::http::{HeaderMap, header};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Extracts the host from the `Host` header.
///
/// Unlike a bare domain lookup, the port is kept: a short link served from
/// `localhost:8080` must point back at `localhost:8080`. IPv6 literals keep
/// their brackets (e.g. `[::1]:8080`).
///
/// # Errors
///
/// Returns [`AppError::Validation`] if:
/// - The `Host` header is missing or empty
/// - The header value contains invalid UTF-8
pub fn extract_host(headers: &HeaderMap) -> Result<String, AppError> {
    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?
        .trim();

    if host.is_empty() {
        return Err(AppError::bad_request(
            "Missing Host header",
            serde_json::json!({}),
        ));
    }

    Ok(host.to_string())
}

/// Builds `scheme://host[:port]` for the request.
///
/// The scheme is `http` unless `behind_proxy` is set and the proxy reports
/// `X-Forwarded-Proto: https`. With `behind_proxy`, `X-Forwarded-Host` takes
/// precedence over `Host`. Only the first entry of a comma-separated
/// forwarded list is used.
///
/// # Errors
///
/// Same as [`extract_host`] when no usable host is available.
pub fn request_origin(headers: &HeaderMap, behind_proxy: bool) -> Result<String, AppError> {
    let mut scheme = "http";
    let mut forwarded_host = None;

    if behind_proxy {
        if let Some(proto) = first_forwarded(headers, X_FORWARDED_PROTO)
            && proto.eq_ignore_ascii_case("https")
        {
            scheme = "https";
        }
        forwarded_host = first_forwarded(headers, X_FORWARDED_HOST);
    }

    let host = match forwarded_host {
        Some(host) => host.to_string(),
        None => extract_host(headers)?,
    };

    Ok(format!("{}://{}", scheme, host))
}

fn first_forwarded<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
