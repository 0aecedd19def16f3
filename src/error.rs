use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;
use crate::response::ApiResponse;

/// Failures of the domain operations. The display text is what the end user
/// sees.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Must be logged in to {0}")]
    Unauthorized(&'static str),
    #[error("Already applied to this job")]
    AlreadyApplied,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::EmailTaken | AppError::AlreadyApplied => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Store(e) => {
                error!(error = %e, "store failure");
                "A storage error occurred".to_string()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal failure");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_users_see() {
        assert_eq!(AppError::InvalidCredentials.to_string(), "Invalid email or password");
        assert_eq!(AppError::EmailTaken.to_string(), "Email already registered");
        assert_eq!(
            AppError::Unauthorized("post jobs").to_string(),
            "Must be logged in to post jobs"
        );
        assert_eq!(AppError::AlreadyApplied.to_string(), "Already applied to this job");
    }

    #[test]
    fn statuses_by_kind() {
        assert_eq!(AppError::Unauthorized("apply").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::EmailTaken.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
