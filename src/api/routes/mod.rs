pub mod cache;
pub mod entitlements;
pub mod health;
pub mod plans;
pub mod tmdb;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::StreamflixError;

/// JSON error body with the status the error kind maps to.
///
/// A 429 gets its own user-facing message so clients can tell "retry later"
/// apart from other failures.
pub(crate) fn error_response(err: &StreamflixError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = if err.is_rate_limited() {
        json!({
            "error": "Too many requests. Please wait a moment and try again.",
            "detail": err.to_string(),
            "rateLimited": true,
        })
    } else {
        json!({ "error": err.to_string() })
    };
    (status, Json(body)).into_response()
}
