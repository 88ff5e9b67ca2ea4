//! HTTP API handlers.

pub mod health;
pub mod solve;
pub mod validate;

use axum::http::StatusCode;
use strider_core::StriderError;

/// Map a planner error to an HTTP status and message.
pub fn error_response(err: StriderError) -> (StatusCode, String) {
    let status = if err.is_setup_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}
