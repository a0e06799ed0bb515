//! # Application Error
//!
//! Maps domain errors to structured HTTP responses with proper status
//! codes and error bodies. Collaborator faults are logged here with their
//! internal detail and surfaced to callers as generic retryable failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use solara_kyc::KycError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication required.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// State-machine conflict (including lost review races). The caller
    /// should re-fetch the current record rather than retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A storage collaborator failed or diverged. Retryable.
    #[error("upstream storage unavailable")]
    BadGateway,

    /// A storage collaborator exceeded its deadline. Retryable.
    #[error("upstream storage timed out")]
    GatewayTimeout,

    /// Internal server error.
    #[error("internal error")]
    Internal,
}

impl From<KycError> for AppError {
    fn from(err: KycError) -> Self {
        if err.is_fault() {
            // Operational detail stays in the logs, never in the body.
            tracing::error!(error = %err, "kyc operation fault");
        }
        match err {
            KycError::Validation(msg) => Self::Validation(msg),
            KycError::Forbidden(msg) => Self::Forbidden(msg),
            KycError::NotFound(msg) => Self::NotFound(msg),
            KycError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            KycError::StorageInconsistency => Self::BadGateway,
            KycError::StorageTimeout => Self::GatewayTimeout,
            KycError::DuplicateStorageKey(_) | KycError::Backend(_) => Self::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}
