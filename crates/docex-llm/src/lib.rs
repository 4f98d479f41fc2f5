//! Docex Collaborator Clients
//!
//! Implementations of the `LanguageModel` and `OcrEngine` traits from
//! `docex-domain`.
//!
//! # Providers
//!
//! - `OllamaProvider`: Local Ollama API (text and image-grounded generation)
//! - `OpenAiCompatibleProvider`: Any `/chat/completions` endpoint
//! - `HttpOcrClient`: OCR service over HTTP
//! - `MockLanguageModel` / `MockOcrEngine`: Deterministic doubles for testing
//!
//! # Examples
//!
//! ```
//! use docex_llm::MockLanguageModel;
//! use docex_domain::{LanguageModel, ModelRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let model = MockLanguageModel::new(r#"{"ok": true}"#);
//! let answer = model.generate(&ModelRequest::text("", "hi")).await.unwrap();
//! assert_eq!(answer, r#"{"ok": true}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod credentials;
pub mod mock;
pub mod ocr;
pub mod ollama;
pub mod openai;

pub use credentials::ApiCredential;
pub use mock::{MockLanguageModel, MockOcrEngine, MockReply};
pub use ocr::HttpOcrClient;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;

use docex_domain::CollaboratorError;

/// Map a transport failure onto the collaborator error taxonomy
pub(crate) fn classify_transport_error(err: &reqwest::Error, timeout_ms: u64) -> CollaboratorError {
    if err.is_timeout() {
        CollaboratorError::Timeout(timeout_ms)
    } else if err.is_connect() || err.is_request() {
        CollaboratorError::Unavailable(format!("Request failed: {}", err))
    } else if err.is_decode() {
        CollaboratorError::InvalidResponse(format!("Failed to parse response: {}", err))
    } else {
        CollaboratorError::Other(err.to_string())
    }
}

/// Map a non-success HTTP status onto the collaborator error taxonomy
pub(crate) fn classify_status(status: reqwest::StatusCode, body: &str) -> CollaboratorError {
    match status.as_u16() {
        429 => CollaboratorError::RateLimited,
        401 | 403 => CollaboratorError::Unavailable(format!("HTTP {}: authentication rejected", status)),
        404 => CollaboratorError::Unavailable(format!("HTTP {}: model or route not found", status)),
        s if s >= 500 => CollaboratorError::Unavailable(format!("HTTP {}: {}", status, body)),
        _ => CollaboratorError::InvalidResponse(format!("HTTP {}: {}", status, body)),
    }
}
