//! Profile extraction: turns raw résumé text into a structured `Profile`.
//!
//! `AppState` holds an `Arc<dyn ProfileExtractor>`; the production backend is
//! `LlmProfileExtractor`, which asks Gemini for JSON constrained by the
//! Profile response schema.

pub mod prompts;
pub mod schema;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::Profile;
use prompts::{PROFILE_EXTRACTION_PROMPT, PROFILE_EXTRACTION_SYSTEM};

/// Implement this to swap extraction backends without touching the workflow.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// `text` is never blank; callers check before invoking.
    async fn extract_profile(&self, text: &str) -> Result<Profile, LlmError>;
}

pub struct LlmProfileExtractor {
    llm: LlmClient,
    schema: Value,
    system: String,
}

impl LlmProfileExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            schema: schema::profile_response_schema(),
            system: format!(
                "{PROFILE_EXTRACTION_SYSTEM} {NO_INVENTION_INSTRUCTION} {JSON_ONLY_SYSTEM}"
            ),
        }
    }
}

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn extract_profile(&self, text: &str) -> Result<Profile, LlmError> {
        let prompt = PROFILE_EXTRACTION_PROMPT.replace("{resume_text}", text);
        let profile: Profile = self
            .llm
            .call_json(&prompt, &self.system, &self.schema)
            .await?;

        info!(
            "Extracted profile for {}",
            profile.email().unwrap_or("<no email>")
        );
        Ok(profile)
    }
}
