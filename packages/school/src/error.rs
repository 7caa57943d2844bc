use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `INVALID_ARGUMENT`, `NOT_FOUND`,
    /// `PROCESSING_ERROR`.
    #[schema(example = "INVALID_ARGUMENT")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Student name cannot be null or empty")]
    pub message: String,
}

/// Application-level error type.
///
/// Every fallible operation in the crate reports one of these three kinds, so
/// callers match on the variant instead of inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Bad input: empty or oversized file, non-positive id, blank field, bad file name.
    #[error("{0}")]
    InvalidArgument(String),
    /// The student, faculty, avatar or avatar file does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Unexpected I/O or persistence failure.
    #[error("processing error: {0}")]
    Processing(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Processing(_) => "PROCESSING_ERROR",
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let code = self.code();
        match self {
            AppError::InvalidArgument(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody { code, message: msg })
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorBody { code, message: msg })
            }
            AppError::Processing(detail) => {
                tracing::error!("Processing error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code,
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Processing(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(location) => {
                AppError::NotFound(format!("Avatar file not found: {location}"))
            }
            StorageError::InvalidName(name) => {
                AppError::InvalidArgument(format!("Invalid file name: {name}"))
            }
            StorageError::Io(e) => AppError::Processing(format!("Avatar storage failure: {e}")),
        }
    }
}
