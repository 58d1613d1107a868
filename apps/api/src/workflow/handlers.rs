//! Axum route handlers for the upload workflow.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::{DuplicateDecision, SaveResult, WorkflowState};

const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub decision: DuplicateDecision,
}

/// POST /api/v1/resumes/upload
///
/// Multipart upload with the résumé in the `file` field. Only PDF and DOCX
/// are accepted; the file is held until `convert` is called.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<WorkflowState>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let bytes = field.bytes().await?;

        let next = state.workflow.receive_file(file_name, bytes).await?;
        return Ok(Json(next));
    }

    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' field"
    )))
}

/// POST /api/v1/resumes/convert
///
/// Extracts text from the uploaded file and runs profile extraction.
/// Responds when both finish; meanwhile `current` reports `converting` or
/// `text_extracted`.
pub async fn handle_convert(
    State(state): State<AppState>,
) -> Result<Json<WorkflowState>, AppError> {
    Ok(Json(state.workflow.convert().await?))
}

/// GET /api/v1/resumes/current
///
/// Returns the cached workflow state, including the extracted profile.
pub async fn handle_current(State(state): State<AppState>) -> Json<WorkflowState> {
    Json(state.workflow.current().await)
}

/// POST /api/v1/resumes/save
pub async fn handle_save(State(state): State<AppState>) -> Result<Json<SaveResult>, AppError> {
    Ok(Json(state.workflow.save().await?))
}

/// POST /api/v1/resumes/save/resolve
///
/// Answers a pending duplicate-email prompt with `overwrite` or `cancel`.
pub async fn handle_resolve(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<SaveResult>, AppError> {
    Ok(Json(state.workflow.resolve_duplicate(request.decision).await?))
}
