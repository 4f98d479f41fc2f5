//! Integration tests for the HTTP surface

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use docex_domain::{CollaboratorError, ExtractionResult, Phase, StrategyId};
use docex_events::{DocumentEvent, COMPLETED, FAILED};
use docex_llm::MockLanguageModel;
use docex_orchestrator::{Collaborators, Orchestrator, Settings};
use docex_server::handlers::{create_router, AppState, ErrorResponse, HealthCheckResponse};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

fn digital_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut ops = String::from("BT /F1 10 Tf 50 740 Td 12 TL (Invoice Number: INV-900) Tj T* ");
    for i in 0..12 {
        ops.push_str(&format!("(Line {} of the remittance terms and conditions apply here) Tj T* ", i));
    }
    ops.push_str("ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1 }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn found() -> String {
    json!({"invoiceNumber": {"value": "INV-900", "page": 1, "location": "header", "snippet": "Invoice Number: INV-900"}})
        .to_string()
}

/// Helper to create an app around scripted models
fn create_app(extraction: MockLanguageModel, verdict: &str) -> Router {
    let mut settings = Settings::default();
    settings.pipeline.retry_backoff_ms = 1;

    let model = Arc::new(extraction);
    let collaborators = Collaborators::new(
        model.clone(),
        model,
        Arc::new(MockLanguageModel::new(verdict)),
        None,
    );
    let orchestrator = Arc::new(Orchestrator::new(&settings, &collaborators));
    create_router(AppState::new(orchestrator, "docex"))
}

fn extract_body(file_type: &str, document: &[u8]) -> String {
    json!({
        "documentBase64": STANDARD.encode(document),
        "fileType": file_type,
        "dataElements": [{"name": "invoiceNumber", "description": "Invoice id", "required": true}]
    })
    .to_string()
}

async fn post(app: Router, uri: &str, body: String) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn extract(app: Router, file_type: &str, document: &[u8]) -> (StatusCode, ExtractionResult) {
    let (status, body) = post(app, "/extract_document_data", extract_body(file_type, document)).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_app(MockLanguageModel::new("{}"), "{}");

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthCheckResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "docex");
}

#[tokio::test]
async fn test_extract_success() {
    let app = create_app(
        MockLanguageModel::new(found()),
        r#"{"score": 0.92, "reasonCode": "strong_match"}"#,
    );

    let (status, result) = extract(app, "pdf", &digital_pdf()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(result.success);
    assert_eq!(result.extracted_data["invoiceNumber"], "INV-900");
    assert_eq!(
        result.extraction_strategy.as_ref().map(|s| s.strategy_id),
        Some(StrategyId::TextLlm)
    );
    assert_eq!(result.provenance["invoiceNumber"].page_index, 0);
    assert!(result.errors.is_none());
}

#[tokio::test]
async fn test_unsupported_type_is_415() {
    let app = create_app(MockLanguageModel::new("{}"), "{}");

    let (status, result) = extract(app, "tiff", b"II*\0data").await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(!result.success);
    assert_eq!(result.failed_phase(), Some(Phase::Classifying));
    assert!(result.document_type.is_none());
}

#[tokio::test]
async fn test_empty_fields_is_400() {
    let app = create_app(MockLanguageModel::new("{}"), "{}");
    let body = json!({
        "documentBase64": STANDARD.encode(digital_pdf()),
        "fileType": "pdf",
        "dataElements": []
    })
    .to_string();

    let (status, body) = post(app, "/extract_document_data", body).await;
    let result: ExtractionResult = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result.failed_phase(), Some(Phase::Intake));
}

#[tokio::test]
async fn test_model_unavailable_is_503_with_metadata() {
    let app = create_app(
        MockLanguageModel::failing(CollaboratorError::Unavailable("connection refused".to_string())),
        "{}",
    );

    let (status, result) = extract(app, "pdf", &digital_pdf()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!result.success);
    assert_eq!(result.failed_phase(), Some(Phase::Extracting));
    assert!(result.document_type.is_some());
    assert!(result.extraction_strategy.is_some());
}

#[tokio::test]
async fn test_timeout_is_504() {
    let app = create_app(
        MockLanguageModel::failing(CollaboratorError::Timeout(100)),
        "{}",
    );

    let (status, result) = extract(app, "pdf", &digital_pdf()).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(result.errors.unwrap()[0].reason, "timeout");
}

#[tokio::test]
async fn test_malformed_model_output_is_502() {
    let app = create_app(MockLanguageModel::new("I could not find any of that."), "{}");

    let (status, result) = extract(app, "pdf", &digital_pdf()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(result.errors.unwrap()[0].reason, "malformed_model_output");
}

#[tokio::test]
async fn test_below_threshold_is_200_unsuccessful() {
    let app = create_app(
        MockLanguageModel::new(found()),
        r#"{"score": 0.4, "reasonCode": "weak_match"}"#,
    );

    let (status, result) = extract(app, "pdf", &digital_pdf()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!result.success);
    assert_eq!(result.extracted_data["invoiceNumber"], "INV-900");
    let errors = result.errors.unwrap();
    assert_eq!(errors[0].phase, Phase::Validating);
    assert_eq!(errors[0].reason, "below_threshold");
}

#[tokio::test]
async fn test_event_round_trip_completed() {
    let app = create_app(
        MockLanguageModel::new(found()),
        r#"{"score": 0.9, "reasonCode": "strong_match"}"#,
    );
    let event = json!({
        "type": "document.extraction.requested",
        "requestId": "0190a0b4-2f3c-7d2e-9a51-3c4d5e6f7a8b",
        "payload": serde_json::from_str::<Value>(&extract_body("pdf", &digital_pdf())).unwrap()
    });

    let (status, body) = post(app, "/events", event.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let reply: DocumentEvent = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.event_type(), COMPLETED);
    assert_eq!(reply.request_id().to_string(), "0190a0b4-2f3c-7d2e-9a51-3c4d5e6f7a8b");
}

#[tokio::test]
async fn test_event_failed_carries_phase() {
    let app = create_app(MockLanguageModel::new("{}"), "{}");
    let event = json!({
        "type": "document.extraction.requested",
        "payload": {"documentBase64": "", "fileType": "pdf", "dataElements": [{"name": "a"}]}
    });

    let (status, body) = post(app, "/events", event.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let reply: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply["type"], FAILED);
    assert_eq!(reply["payload"]["phase"], "intake");
}

#[tokio::test]
async fn test_event_rejections() {
    let app = create_app(MockLanguageModel::new("{}"), "{}");

    let (status, body) = post(app.clone(), "/events", "{\"type\": \"nope\"}".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(!error.error.is_empty());

    let completed = json!({
        "type": "document.extraction.failed",
        "requestId": "0190a0b4-2f3c-7d2e-9a51-3c4d5e6f7a8b",
        "payload": {"phase": "intake", "reason": "missing_payload", "message": "no payload"}
    });
    let (status, _) = post(app, "/events", completed.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
