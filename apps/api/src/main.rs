mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod profile_extraction;
mod routes;
mod skills;
mod state;
mod store;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::llm_client::LlmClient;
use crate::profile_extraction::LlmProfileExtractor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::ProfileStore;
use crate::workflow::UploadWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume intake v{}", env!("CARGO_PKG_VERSION"));

    // Profile store (CSV)
    let store = ProfileStore::new(&config.profile_store_path);
    info!(
        "Profile store: {} ({} rows)",
        store.path().display(),
        store.row_count()?
    );

    // Text extraction, configured once at startup
    let extractor = TextExtractor::new(config.extractor_config());
    info!(
        "Text extractor: max upload {} bytes, normalize={}",
        extractor.config().max_upload_bytes,
        extractor.config().normalize_text
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.google_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let workflow = UploadWorkflow::new(
        extractor,
        Arc::new(LlmProfileExtractor::new(llm)),
        store.clone(),
    );

    // Build app state
    let state = AppState {
        workflow: Arc::new(workflow),
        store,
    };

    // Build router
    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the dashboard origin before exposing beyond localhost

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
