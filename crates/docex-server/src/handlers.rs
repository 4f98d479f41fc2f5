//! HTTP request handlers for the extraction service.
//!
//! Exposes the synchronous tool call and the event surface using axum.

use crate::status::status_for;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use docex_domain::{ErrorRecord, ExtractionResult, Phase};
use docex_events::{DocumentEvent, EventWorker};
use docex_orchestrator::{ExtractDocumentInput, Orchestrator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline driver for tool calls
    pub orchestrator: Arc<Orchestrator>,
    /// Event handler sharing the same orchestrator
    pub worker: Arc<EventWorker>,
    /// Name reported by `/health`
    pub service_name: String,
}

impl AppState {
    /// Build state around one orchestrator
    pub fn new(orchestrator: Arc<Orchestrator>, service_name: impl Into<String>) -> Self {
        Self {
            worker: Arc::new(EventWorker::new(Arc::clone(&orchestrator))),
            orchestrator,
            service_name: service_name.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service name
    pub service: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Body did not parse as an event
    BadEvent(String),
    /// Event type this surface does not accept
    UnacceptedEvent(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadEvent(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnacceptedEvent(event_type) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Only document.extraction.requested is accepted, got {}", event_type),
            ),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Result for a body that never reached the pipeline
fn rejected(rejection: JsonRejection) -> ExtractionResult {
    let record = ErrorRecord::new(Phase::Intake, "malformed_request", rejection.body_text())
        .with_remediation("Send a JSON object with documentBase64, fileType and dataElements");
    ExtractionResult {
        success: false,
        document_type: None,
        extraction_strategy: None,
        extracted_data: BTreeMap::new(),
        confidence_per_field: BTreeMap::new(),
        overall_confidence: None,
        provenance: BTreeMap::new(),
        errors: Some(vec![record]),
    }
}

/// POST /extract_document_data - Run the pipeline on one document
///
/// The body is always an `ExtractionResult`; failures keep whatever
/// classification and routing metadata was known.
async fn extract_document_data(
    State(state): State<AppState>,
    body: Result<Json<ExtractDocumentInput>, JsonRejection>,
) -> (StatusCode, Json<ExtractionResult>) {
    let result = match body {
        Ok(Json(input)) => {
            info!(file_type = %input.file_type, fields = input.data_elements.len(), "Extraction requested");
            state.orchestrator.run(input.into_request()).await
        }
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected extraction body");
            rejected(rejection)
        }
    };

    (status_for(&result), Json(result))
}

/// POST /events - Handle one `document.extraction.requested` event
///
/// Replies with the matching `completed` or `failed` event.
async fn post_event(
    State(state): State<AppState>,
    body: Result<Json<DocumentEvent>, JsonRejection>,
) -> Result<Json<DocumentEvent>, AppError> {
    let Json(event) = body.map_err(|e| AppError::BadEvent(e.body_text()))?;
    let event_type = event.event_type();

    state
        .worker
        .handle(event)
        .await
        .map(Json)
        .ok_or(AppError::UnacceptedEvent(event_type))
}

/// GET /health - Liveness check
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/extract_document_data", post(extract_document_data))
        .route("/events", post(post_event))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use docex_llm::MockLanguageModel;
    use docex_orchestrator::{Collaborators, Settings};
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        let model = Arc::new(MockLanguageModel::new("{}"));
        let collaborators = Collaborators::new(model.clone(), model.clone(), model, None);
        let orchestrator = Arc::new(Orchestrator::new(&Settings::default(), &collaborators));
        AppState::new(orchestrator, "docex-test")
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_is_intake_error() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/extract_document_data")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: ExtractionResult = serde_json::from_slice(&body).unwrap();
        assert!(!result.success);
        assert_eq!(result.failed_phase(), Some(Phase::Intake));
    }
}
