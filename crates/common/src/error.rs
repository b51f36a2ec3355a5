use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<UnknownResource> for AppError {
    fn from(err: UnknownResource) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Fetch(FetchError::Rejected(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::Fetch(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

/// Failure of a single resource fetch or backend mutation.
///
/// All variants are transient from the synchronizer's point of view: the
/// resource stays stale and is retried on the next tick or event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("no source registered for resource '{0}'")]
    Unavailable(String),

    /// The backend understood a mutation and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// A resource name that does not match any managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource '{0}'")]
pub struct UnknownResource(pub String);
