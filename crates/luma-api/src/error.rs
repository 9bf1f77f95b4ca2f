//! API error types and JSON error response formatting.
//!
//! Every failing endpoint answers with the same body shape:
//! `{"error": "<human readable>", "code": "<machine readable>"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use luma_engine::GroupingError;

/// Message returned when a request carries no usable intent text.
pub const INTENT_TEXT_REQUIRED: &str = "intent_text is required";

/// Message returned when no group matches a lookup.
pub const NO_INTERACTIONS_FOUND: &str = "No interactions found for this intent";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message, e.g. "intent_text is required".
    pub error: String,
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub code: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 404 Not Found - nothing stored under the given key.
    NotFound(String),
    /// 413 Payload Too Large - body over the router limit.
    PayloadTooLarge(String),
    /// 500 Internal Server Error - store failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<GroupingError> for ApiError {
    fn from(err: GroupingError) -> Self {
        error!(error = %err, "Grouping operation failed");
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}
