//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use legalqa_core::AppError;
use serde_json::json;

/// Message returned for upstream and internal failures.
pub const GENERIC_FAILURE: &str =
    "An error occurred while processing your question. Please try again.";

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            err if err.is_upstream_unavailable() => {
                (StatusCode::SERVICE_UNAVAILABLE, GENERIC_FAILURE.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self.0);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self.0);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
