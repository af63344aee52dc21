use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::{ErrorBody, ErrorEnvelope};

/// Failure kinds a caller can tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// Malformed or empty caller input.
    #[error("{0}")]
    InvalidArgument(String),
    /// The service is missing its credential.
    #[error("{0}")]
    FailedPrecondition(String),
    /// Upstream call failed or returned something unusable.
    #[error("Failed to estimate calories: {0}")]
    Internal(String),
}

impl EstimateError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        EstimateError::InvalidArgument(message.into())
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        EstimateError::FailedPrecondition(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        EstimateError::Internal(message.into())
    }

    /// Canonical kind string carried in the error envelope.
    pub fn status(&self) -> &'static str {
        match self {
            EstimateError::InvalidArgument(_) => "INVALID_ARGUMENT",
            EstimateError::FailedPrecondition(_) => "FAILED_PRECONDITION",
            EstimateError::Internal(_) => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            EstimateError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            EstimateError::FailedPrecondition(_) | EstimateError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorBody {
                message: self.to_string(),
                status: self.status(),
            },
        }
    }
}

impl IntoResponse for EstimateError {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self.envelope())).into_response()
    }
}
