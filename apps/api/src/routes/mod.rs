pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::skills::handlers as skills;
use crate::state::AppState;
use crate::workflow::handlers as workflow;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState, max_upload_bytes: u64) -> Router {
    let body_limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        // Upload workflow
        .route("/api/v1/resumes/upload", post(workflow::handle_upload))
        .route("/api/v1/resumes/convert", post(workflow::handle_convert))
        .route("/api/v1/resumes/current", get(workflow::handle_current))
        .route("/api/v1/resumes/save", post(workflow::handle_save))
        .route(
            "/api/v1/resumes/save/resolve",
            post(workflow::handle_resolve),
        )
        // Skills filter
        .route("/api/v1/profiles", get(skills::handle_list_profiles))
        .route("/api/v1/skills", get(skills::handle_list_skills))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::extraction::{ExtractorConfig, TextExtractor};
    use crate::llm_client::LlmError;
    use crate::models::{Profile, TechnicalSkills};
    use crate::profile_extraction::ProfileExtractor;
    use crate::store::ProfileStore;
    use crate::workflow::UploadWorkflow;

    struct Unreachable;

    #[async_trait]
    impl ProfileExtractor for Unreachable {
        async fn extract_profile(&self, _text: &str) -> Result<Profile, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn app(dir: &std::path::Path) -> (Router, ProfileStore) {
        let store = ProfileStore::new(dir.join("profiles.csv"));
        let workflow = UploadWorkflow::new(
            TextExtractor::new(ExtractorConfig::default()),
            Arc::new(Unreachable),
            store.clone(),
        );
        let state = AppState {
            workflow: Arc::new(workflow),
            store: store.clone(),
        };
        (build_router(state, 1024), store)
    }

    fn stored(email: &str, langs: &[&str]) -> Profile {
        Profile {
            email_id: Some(email.to_string()),
            technical_skills: TechnicalSkills {
                programming_languages: langs.iter().map(|s| s.to_string()).collect(),
                ..TechnicalSkills::default()
            },
            ..Profile::default()
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_profiles_without_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let (status, body) = get_json(app, "/api/v1/profiles").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store_initialized"], false);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_profiles_filter_and_skill_list() {
        let dir = tempfile::tempdir().unwrap();
        let (app, store) = app(dir.path());
        store.insert(&stored("a@x.com", &["Python", "SQL"])).unwrap();
        store.insert(&stored("b@x.com", &["Go"])).unwrap();
        store.insert(&stored("c@x.com", &["Node, js", "SQL"])).unwrap();

        let (_, body) = get_json(app.clone(), "/api/v1/profiles?skills=Python").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["profiles"][0]["email_id"], "a@x.com");

        let (_, body) = get_json(app.clone(), "/api/v1/profiles?skills=Python&skills=Go").await;
        assert_eq!(body["total"], 0);

        let (_, body) = get_json(app.clone(), "/api/v1/profiles?skills=Node%2C%20js").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["selected"], serde_json::json!(["Node, js"]));
        assert_eq!(body["profiles"][0]["email_id"], "c@x.com");

        let (_, body) = get_json(app, "/api/v1/skills").await;
        assert_eq!(
            body["skills"],
            serde_json::json!(["Go", "Node, js", "Python", "SQL"])
        );
    }

    #[tokio::test]
    async fn test_current_state_starts_idle() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let (_, body) = get_json(app, "/api/v1/resumes/current").await;
        assert_eq!(body["state"], "idle");
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());

        let body = "--BOUNDARY\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --BOUNDARY--\r\n";
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload")
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_save_without_profile_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/save")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
