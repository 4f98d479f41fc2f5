//! docex HTTP Server
//!
//! Serves the extraction pipeline over HTTP:
//! - `GET /health` - liveness
//! - `POST /extract_document_data` - synchronous tool call
//! - `POST /events` - one `document.extraction.requested` event in, its
//!   `completed`/`failed` event out

#![warn(missing_docs)]

pub mod handlers;
pub mod status;

use docex_orchestrator::{Collaborators, ConfigError, Orchestrator, Settings};
use handlers::{create_router, AppState};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP server
///
/// Builds the collaborator pool, binds the configured address and serves
/// until `shutdown` resolves. The pool is released afterwards.
pub async fn start_server<F>(settings: Settings, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Starting docex server");
    info!("Bind address: {}", settings.server.bind_addr());
    info!(
        provider = ?settings.models.provider,
        extraction_model = %settings.models.extraction_model,
        validation_model = %settings.models.validation_model,
        ocr = settings.ocr.endpoint.is_some(),
        "Collaborators configured"
    );

    let collaborators = Collaborators::from_settings(&settings)?;
    let orchestrator = Arc::new(Orchestrator::new(&settings, &collaborators));
    let state = AppState::new(orchestrator, settings.server.service_name.clone());
    let worker = Arc::clone(&state.worker);

    let app = create_router(state);

    let listener = TcpListener::bind(&settings.server.bind_addr()).await?;
    info!("Server listening on {}", settings.server.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped: {}", worker.metrics().summary());
    collaborators.shutdown();
    Ok(())
}
