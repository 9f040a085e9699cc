//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::warn;
use scout_rs_core::ScoutCoreError;
use serde::Serialize;
use thiserror::Error;

/// Body of every JSON error response.
#[derive(Debug, Clone, Serialize)]
pub struct StatusBody {
    pub status: u16,
    pub message: String,
    pub description: String,
}

/// Errors a handler can turn into a response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Storage failed; 500 with a JSON status body.
    #[error("storage error: {0}")]
    Storage(String),
    /// Missing permission; 401 with a JSON status body.
    #[error("missing permission {0}")]
    Unauthorized(String),
    /// Unusable request body; 400 with a JSON status body.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Failure left to the generic error layer; bare 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Treat any core failure as opaque. Used by the delete routes.
    pub fn internal(err: ScoutCoreError) -> Self {
        match err {
            ScoutCoreError::Unauthorized { permission } => Self::Unauthorized(permission),
            other => Self::Internal(other.to_string()),
        }
    }

    fn status_body(status: StatusCode, message: &str, description: String) -> Response {
        let body = StatusBody {
            status: status.as_u16(),
            message: message.to_string(),
            description,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ScoutCoreError> for ApiError {
    fn from(err: ScoutCoreError) -> Self {
        match err {
            ScoutCoreError::Storage(err) => Self::Storage(err.to_string()),
            ScoutCoreError::Unauthorized { permission } => Self::Unauthorized(permission),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Storage(description) => Self::status_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage Error",
                description,
            ),
            Self::Unauthorized(permission) => Self::status_body(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                format!("Missing permission {permission}"),
            ),
            Self::BadRequest(description) => {
                Self::status_body(StatusCode::BAD_REQUEST, "Bad Request", description)
            }
            Self::Internal(detail) => {
                warn!("request failed: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
