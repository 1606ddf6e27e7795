//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::MutationError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog or order mutation failed.
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Mutation(MutationError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Mutation(MutationError::Invalid(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Mutation(MutationError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Mutation(MutationError::Database(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Mutation(MutationError::Database(_)) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Mutation(MutationError::NotFound) => "Not found".to_string(),
            Self::Mutation(MutationError::Invalid(reason)) => reason.clone(),
            Self::Mutation(MutationError::Conflict(reason)) => reason.clone(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use hearth_storefront::db::RepositoryError;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("category".to_string());
        assert_eq!(err.to_string(), "Not found: category");

        let err = AppError::Mutation(MutationError::Invalid("name is required".to_string()));
        assert_eq!(
            err.to_string(),
            "Mutation error: invalid input: name is required"
        );
    }

    #[test]
    fn test_mutation_status_codes() {
        assert_eq!(
            get_status(MutationError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(MutationError::Invalid("slug".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(MutationError::Conflict("referenced by orders".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                MutationError::Database(RepositoryError::DataCorruption("x".to_string())).into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
