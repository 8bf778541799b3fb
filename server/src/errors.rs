//! API errors mapped to HTTP status codes with a `{"error": "message"}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub const MISSING_QUERY: &str = "Missing query parameter 'q'";
pub const INVALID_K: &str = "Invalid query parameter 'k'";
pub const DOC_NOT_FOUND: &str = "Document not found";

#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters (400).
    BadRequest(String),
    /// Unknown document (404).
    NotFound(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<cranfield_core::Error> for ApiError {
    fn from(err: cranfield_core::Error) -> Self {
        match err {
            cranfield_core::Error::InvalidArgument(msg) => ApiError::BadRequest(msg),
            cranfield_core::Error::NotFound(_) => ApiError::NotFound(DOC_NOT_FOUND.into()),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}
