// src/api/error.rs

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::core::models::InvalidTarget;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub message: String,
    /// The rejected input, present only for invalid-target responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_input: Option<String>,
}

/// Errors surfaced to API callers, each with a distinguishable status code.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request — malformed or private/local target.
    InvalidTarget(InvalidTarget),
    /// 429 Too Many Requests — admission quota exhausted for this client.
    QuotaExceeded,
    /// 500 Internal Server Error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_key, message, original_input) = match self {
            ApiError::InvalidTarget(err) => (
                StatusCode::BAD_REQUEST,
                "invalid_target",
                err.message,
                Some(err.original_input),
            ),
            ApiError::QuotaExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "quota_exceeded",
                "rate limit exceeded, please try again later".to_string(),
                None,
            ),
            ApiError::Internal(msg) => {
                // Log the real error server-side, return a generic message to
                // the client to avoid leaking internal details.
                tracing::error!(details = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(ApiErrorBody {
                error: error_key.into(),
                message,
                original_input,
            }),
        )
            .into_response()
    }
}

impl From<InvalidTarget> for ApiError {
    fn from(err: InvalidTarget) -> Self {
        ApiError::InvalidTarget(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidTarget(err) => write!(f, "invalid target: {err}"),
            ApiError::QuotaExceeded => write!(f, "quota exceeded"),
            ApiError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}
