//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use interview_core::ProgressionError;
use serde_json::json;
use tracing::warn;

use crate::db::DbError;
use crate::session::SessionNotFound;

/// Error returned by API handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ApiError {
    /// Unknown session (404).
    #[display("{_0}")]
    NotFound(String),
    /// Input rejected by validation (422).
    #[display("{_0}")]
    Validation(String),
    /// Action not allowed in the current state (409).
    #[display("{_0}")]
    Conflict(String),
    /// Unexpected server failure (500).
    #[display("{_0}")]
    Internal(String),
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SessionNotFound> for ApiError {
    fn from(err: SessionNotFound) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<ProgressionError> for ApiError {
    fn from(err: ProgressionError) -> Self {
        let message = err.to_string();
        match err {
            ProgressionError::Identification(_)
            | ProgressionError::Submission(_)
            | ProgressionError::WrongSubmissionKind { .. }
            | ProgressionError::BlockOutOfRange { .. } => Self::Validation(message),
            ProgressionError::IllegalTransition { .. } | ProgressionError::RetryNotAllowed => {
                Self::Conflict(message)
            }
            ProgressionError::InvariantViolation(_) => Self::Internal(message),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::{Phase, SubmissionError};

    #[test]
    fn progression_errors_map_to_statuses() {
        let validation: ApiError = ProgressionError::Submission(SubmissionError::NothingSelected).into();
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let conflict: ApiError = ProgressionError::IllegalTransition {
            action: "start",
            phase: Phase::Finished,
        }
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing: ApiError = SessionNotFound("x".to_string()).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
