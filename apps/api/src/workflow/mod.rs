//! Upload workflow. Drives one résumé from upload to a saved profile.
//!
//! Idle → FileReceived → Converting → TextExtracted → ProfileExtracted →
//! (save) → Idle on insert, or DuplicateFound until the operator overwrites
//! (→ Idle) or cancels (→ ProfileExtracted). Extraction failures park the
//! session in Failed until a new file arrives.
//!
//! The session sits behind one async mutex. Saves hold it for the whole
//! transition, so a save can never race another save. A conversion releases
//! it while the document is read and while the extraction service runs, so
//! `current` keeps answering; each conversion carries an attempt number and
//! its result is dropped if a newer upload replaced it in the meantime.

pub mod handlers;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::extraction::{ExtractError, TextExtractor};
use crate::llm_client::LlmError;
use crate::models::Profile;
use crate::profile_extraction::ProfileExtractor;
use crate::store::{ProfileStore, SaveOutcome, StoreError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Could not extract any text from the uploaded file")]
    EmptyDocument,

    #[error("Profile extraction service failed: {0}")]
    Service(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    InvalidState(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExtractionError,
    EmptyDocument,
    ExtractionServiceError,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    FileReceived {
        file_name: String,
        size_bytes: usize,
        #[serde(skip)]
        bytes: Bytes,
    },
    /// Reading the document's text.
    Converting {
        file_name: String,
        #[serde(skip)]
        attempt: u64,
    },
    /// Text is in hand; waiting on the extraction service.
    TextExtracted {
        file_name: String,
        characters: usize,
        #[serde(skip)]
        attempt: u64,
    },
    ProfileExtracted {
        profile: Profile,
    },
    /// Save found a stored row with the same email; waiting on the operator.
    DuplicateFound {
        email: String,
        profile: Profile,
        /// `None` when the stored row cannot be decoded.
        existing: Option<Profile>,
    },
    Failed {
        error: FailureKind,
        message: String,
    },
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileReceived { .. } => "file_received",
            Self::Converting { .. } => "converting",
            Self::TextExtracted { .. } => "text_extracted",
            Self::ProfileExtracted { .. } => "profile_extracted",
            Self::DuplicateFound { .. } => "duplicate_found",
            Self::Failed { .. } => "failed",
        }
    }

    fn attempt(&self) -> Option<u64> {
        match self {
            Self::Converting { attempt, .. } | Self::TextExtracted { attempt, .. } => {
                Some(*attempt)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDecision {
    Overwrite,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveResult {
    Inserted { email: String },
    AwaitingConfirmation { email: String },
    Overwritten { email: String },
    Cancelled { email: String },
}

pub struct UploadWorkflow {
    extractor: TextExtractor,
    profiles: Arc<dyn ProfileExtractor>,
    store: ProfileStore,
    state: Mutex<WorkflowState>,
    attempts: AtomicU64,
}

impl UploadWorkflow {
    pub fn new(
        extractor: TextExtractor,
        profiles: Arc<dyn ProfileExtractor>,
        store: ProfileStore,
    ) -> Self {
        Self {
            extractor,
            profiles,
            store,
            state: Mutex::new(WorkflowState::Idle),
            attempts: AtomicU64::new(0),
        }
    }

    /// The cached state, unchanged by reading it.
    pub async fn current(&self) -> WorkflowState {
        self.state.lock().await.clone()
    }

    /// Accepts a new upload. Rejected files leave the session untouched; an
    /// accepted one replaces any conversion still in flight.
    pub async fn receive_file(
        &self,
        file_name: String,
        bytes: Bytes,
    ) -> Result<WorkflowState, WorkflowError> {
        let mut state = self.state.lock().await;
        if let WorkflowState::DuplicateFound { email, .. } = &*state {
            return Err(WorkflowError::InvalidState(format!(
                "Resolve the pending duplicate for {email} before uploading another file"
            )));
        }

        self.extractor.check_upload(&file_name, bytes.len())?;

        info!("Received '{file_name}' ({} bytes)", bytes.len());
        let next = WorkflowState::FileReceived {
            size_bytes: bytes.len(),
            file_name,
            bytes,
        };
        transition(&mut state, next);
        Ok(state.clone())
    }

    /// Extracts text from the received file and asks the extraction service
    /// for a profile. Only valid in FileReceived.
    pub async fn convert(&self) -> Result<WorkflowState, WorkflowError> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let (file_name, bytes) = {
            let mut state = self.state.lock().await;
            let WorkflowState::FileReceived {
                file_name, bytes, ..
            } = &*state
            else {
                return Err(WorkflowError::InvalidState(format!(
                    "Nothing to convert in state '{}'; upload a file first",
                    state.name()
                )));
            };
            let upload = (file_name.clone(), bytes.clone());
            transition(
                &mut state,
                WorkflowState::Converting {
                    file_name: upload.0.clone(),
                    attempt,
                },
            );
            upload
        };

        let extracted = self.extractor.extract_upload(&file_name, bytes).await;
        let text = {
            let mut state = self.claim(attempt).await?;
            let text = match extracted {
                Ok(text) => text,
                Err(e) => {
                    fail(&mut state, FailureKind::ExtractionError, &e);
                    return Err(e.into());
                }
            };
            transition(
                &mut state,
                WorkflowState::TextExtracted {
                    file_name,
                    characters: text.chars().count(),
                    attempt,
                },
            );

            if text.trim().is_empty() {
                let e = WorkflowError::EmptyDocument;
                fail(&mut state, FailureKind::EmptyDocument, &e);
                return Err(e);
            }
            text
        };

        let extracted = self.profiles.extract_profile(&text).await;
        let mut state = self.claim(attempt).await?;
        let profile = match extracted {
            Ok(profile) => profile.with_derived_skills(),
            Err(e) => {
                fail(&mut state, FailureKind::ExtractionServiceError, &e);
                return Err(e.into());
            }
        };

        transition(&mut state, WorkflowState::ProfileExtracted { profile });
        Ok(state.clone())
    }

    /// Re-locks the session for the next step of conversion `attempt`,
    /// unless a newer upload has replaced it.
    async fn claim(&self, attempt: u64) -> Result<MutexGuard<'_, WorkflowState>, WorkflowError> {
        let state = self.state.lock().await;
        if state.attempt() == Some(attempt) {
            return Ok(state);
        }
        info!(
            "Dropping result of conversion {attempt}; session moved on to '{}'",
            state.name()
        );
        Err(WorkflowError::InvalidState(
            "The upload was replaced while it was being converted".to_string(),
        ))
    }

    /// Persists the extracted profile, or parks in DuplicateFound when the
    /// email is already stored. Store errors leave the profile in place.
    pub async fn save(&self) -> Result<SaveResult, WorkflowError> {
        let mut state = self.state.lock().await;
        let WorkflowState::ProfileExtracted { profile } = &*state else {
            return Err(WorkflowError::InvalidState(format!(
                "Cannot save in state '{}'",
                state.name()
            )));
        };
        let profile = profile.clone();
        let email = profile
            .email()
            .ok_or(StoreError::MissingEmail)?
            .to_string();

        let store = self.store.clone();
        let candidate = profile.clone();
        let outcome = tokio::task::spawn_blocking(move || store.save(&candidate)).await??;

        match outcome {
            SaveOutcome::Inserted => {
                transition(&mut state, WorkflowState::Idle);
                Ok(SaveResult::Inserted { email })
            }
            SaveOutcome::AwaitingConfirmation { existing } => {
                transition(
                    &mut state,
                    WorkflowState::DuplicateFound {
                        email: email.clone(),
                        profile,
                        existing,
                    },
                );
                Ok(SaveResult::AwaitingConfirmation { email })
            }
        }
    }

    /// Applies the operator's answer to a pending duplicate.
    pub async fn resolve_duplicate(
        &self,
        decision: DuplicateDecision,
    ) -> Result<SaveResult, WorkflowError> {
        let mut state = self.state.lock().await;
        let WorkflowState::DuplicateFound { email, profile, .. } = &*state else {
            return Err(WorkflowError::InvalidState(format!(
                "No duplicate is pending (state '{}')",
                state.name()
            )));
        };
        let (email, profile) = (email.clone(), profile.clone());

        match decision {
            DuplicateDecision::Overwrite => {
                let store = self.store.clone();
                let (key, candidate) = (email.clone(), profile);
                tokio::task::spawn_blocking(move || store.overwrite(&key, &candidate)).await??;
                transition(&mut state, WorkflowState::Idle);
                Ok(SaveResult::Overwritten { email })
            }
            DuplicateDecision::Cancel => {
                info!("Save of {email} cancelled; store untouched");
                transition(&mut state, WorkflowState::ProfileExtracted { profile });
                Ok(SaveResult::Cancelled { email })
            }
        }
    }
}

fn transition(state: &mut WorkflowState, next: WorkflowState) {
    info!("Workflow {} -> {}", state.name(), next.name());
    *state = next;
}

fn fail(state: &mut WorkflowState, error: FailureKind, cause: &dyn std::fmt::Display) {
    warn!("Upload failed ({error:?}): {cause}");
    transition(
        state,
        WorkflowState::Failed {
            error,
            message: cause.to_string(),
        },
    );
}
