//! HTTP API for the campus agents.

mod routes;
pub mod types;

use std::sync::Arc;

pub use routes::{router, AppState};

use crate::agent::AgentService;
use crate::config::Config;
use crate::documents::{DocumentStore, SharedDocumentStore};
use crate::llm::{backend_from_config, GenerationClient, GenerationOptions};

/// Build the shared state: document store, model client and agent service.
///
/// The backend is constructed exactly once here and shared by every request.
pub async fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let documents: SharedDocumentStore = Arc::new(DocumentStore::load(&config.documents_path).await?);
    tracing::debug!(agents = ?documents.agent_ids(), "Grounding agents available");

    let backend = backend_from_config(&config.generation);
    let generator = GenerationClient::new(
        backend,
        GenerationOptions::from(&config.generation),
        config.generation.concurrency,
    );
    tracing::info!(
        backend = ?config.generation.backend,
        url = %config.generation.url,
        concurrency = config.generation.concurrency,
        "Generation client ready"
    );

    let agents = AgentService::new(documents, generator, config.generation.clone());
    Ok(Arc::new(AppState::new(config, agents)))
}

/// Start the HTTP server and run until it stops.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = build_state(config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
