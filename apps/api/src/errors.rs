use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractError;
use crate::store::StoreError;
use crate::workflow::WorkflowError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Could not extract any text from the uploaded file")]
    EmptyDocument,

    #[error("Extraction service error: {0}")]
    ExtractionService(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store I/O error: {0}")]
    Io(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Extract(e) => e.into(),
            WorkflowError::EmptyDocument => AppError::EmptyDocument,
            WorkflowError::Service(e) => AppError::ExtractionService(e.to_string()),
            WorkflowError::Store(e) => e.into(),
            WorkflowError::InvalidState(msg) => AppError::Conflict(msg),
            WorkflowError::Task(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat(_) => AppError::UnsupportedFormat(err.to_string()),
            ExtractError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ExtractError::Extraction { .. } | ExtractError::Staging(_) => {
                AppError::Extraction(err.to_string())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingEmail => AppError::Validation(err.to_string()),
            StoreError::Duplicate(_) => AppError::Conflict(err.to_string()),
            StoreError::Io(_) | StoreError::Csv(_) | StoreError::Encode(_) => {
                AppError::Io(err.to_string())
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart upload: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", msg.clone())
            }
            AppError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                msg.clone(),
            ),
            AppError::EmptyDocument => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_DOCUMENT",
                self.to_string(),
            ),
            AppError::ExtractionService(msg) => {
                tracing::error!("Extraction service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_SERVICE_ERROR",
                    "The profile extraction service failed; upload the file again to retry"
                        .to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg.clone()),
            AppError::Io(msg) => {
                tracing::error!("Store I/O error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "The profile store could not be read or written".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
