//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local generate API. Images are passed
//! base64-encoded in the `images` array, which multimodal models read.
//!
//! # Examples
//!
//! ```no_run
//! use docex_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new(reqwest::Client::new(), "http://localhost:11434", "llama3.2");
//! ```

use crate::{classify_status, classify_transport_error};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use docex_domain::{CollaboratorError, LanguageModel, ModelRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default number of attempts per call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Ollama API provider
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_attempts: u32,
    json_mode: bool,
    timeout_ms: u64,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider sharing the given HTTP client
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            json_mode: true,
            timeout_ms: 0,
        }
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Ask Ollama to constrain output to JSON (on by default)
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// Timeout reported in `CollaboratorError::Timeout` when the client times out
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn generate_once(&self, request: &ModelRequest) -> Result<String, CollaboratorError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: &request.system,
            images: request.images.iter().map(|i| STANDARD.encode(&i.data)).collect(),
            format: self.json_mode.then_some("json"),
            stream: false,
            options: OllamaOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &error_text));
        }

        response
            .json::<OllamaGenerateResponse>()
            .await
            .map(|r| r.response)
            .map_err(|e| CollaboratorError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    async fn generate(&self, request: &ModelRequest) -> Result<String, CollaboratorError> {
        let mut attempts = 0;
        loop {
            match self.generate_once(request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    attempts += 1;
                    if attempts >= self.max_attempts || !e.is_unavailable() {
                        return Err(e);
                    }
                    tracing::debug!(model = %self.model, attempts, "Ollama call failed, retrying: {}", e);
                    // Exponential backoff: 1s, 2s, 4s, etc.
                    let delay = Duration::from_secs(2u64.pow(attempts - 1));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docex_domain::ImageInput;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new(reqwest::Client::new(), "http://localhost:11434/", "llama3.2");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.name(), "llama3.2");
        assert_eq!(provider.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(provider.json_mode);
    }

    #[test]
    fn test_request_body_includes_images_and_format() {
        let request = ModelRequest::text("sys", "find total").with_images(vec![ImageInput {
            media_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        }]);
        let body = OllamaGenerateRequest {
            model: "llava",
            prompt: &request.prompt,
            system: &request.system,
            images: request.images.iter().map(|i| STANDARD.encode(&i.data)).collect(),
            format: Some("json"),
            stream: false,
            options: OllamaOptions { temperature: 0.0 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["images"][0], "AQID");
        assert_eq!(json["format"], "json");
        assert_eq!(json["system"], "sys");
        assert_eq!(json["stream"], false);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let provider = OllamaProvider::new(reqwest::Client::new(), "http://127.0.0.1:9", "llama3.2");
        let result = provider.generate(&ModelRequest::text("", "test")).await;
        assert!(matches!(result, Err(CollaboratorError::Unavailable(_))));
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore]
    async fn test_ollama_generate_integration() {
        let provider = OllamaProvider::new(reqwest::Client::new(), DEFAULT_ENDPOINT, "llama3.2");
        let result = provider
            .generate(&ModelRequest::text("", "Reply with {\"hello\": true}"))
            .await;
        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
