//! Application error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::domain::repositories::RepositoryError;

/// Message returned for keys that do not resolve to a record.
pub const NOT_FOUND_MESSAGE: &str = "No URL associated with this key.";

/// Errors surfaced to HTTP handlers and CLI callers.
///
/// `details` must be a JSON object (or `null`); its fields are merged into
/// the response body next to `error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("no sequence id could be allocated after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    #[error("{message}")]
    Unavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    /// The client-visible "no such key" error used for both unknown and
    /// undecodable keys.
    pub fn key_not_found() -> Self {
        Self::not_found(NOT_FOUND_MESSAGE, Value::Null)
    }

    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AllocationExhausted { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let details = match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Unavailable { details, .. }
            | AppError::Internal { details, .. } => details,
            AppError::AllocationExhausted { .. } => Value::Null,
        };

        let mut body = match details {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        body.insert("error".to_string(), Value::String(message));

        (status, Json(Value::Object(body))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        let reason = e.to_string();

        match e {
            RepositoryError::Unavailable(_) => {
                AppError::unavailable("Storage unavailable", json!({ "reason": reason }))
            }
            RepositoryError::Corrupted(_) => {
                AppError::internal("Storage returned corrupted data", json!({ "reason": reason }))
            }
            // Duplicate keys only reach here when a caller outside the
            // allocator inserts directly.
            RepositoryError::DuplicateSequenceId(_) | RepositoryError::DuplicateOriginalUrl(_) => {
                AppError::internal("Unique constraint violation", json!({ "reason": reason }))
            }
        }
    }
}
