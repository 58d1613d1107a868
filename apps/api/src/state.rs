use std::sync::Arc;

use crate::store::ProfileStore;
use crate::workflow::UploadWorkflow;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single operator's upload session.
    pub workflow: Arc<UploadWorkflow>,
    /// Read side for the skills filter.
    pub store: ProfileStore,
}
