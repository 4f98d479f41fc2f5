//! OpenAI-compatible chat completions provider
//!
//! Works against any service exposing `POST {endpoint}/chat/completions`.
//! Images are sent as `data:` URLs in `image_url` content parts.

use crate::{classify_status, classify_transport_error, ApiCredential};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use docex_domain::{CollaboratorError, LanguageModel, ModelRequest};
use serde::Deserialize;
use serde_json::{json, Value};

/// Provider for OpenAI-compatible chat endpoints
pub struct OpenAiCompatibleProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    credential: Option<ApiCredential>,
    timeout_ms: u64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Create a provider sharing the given HTTP client
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            credential: None,
            timeout_ms: 0,
        }
    }

    /// Authenticate with a bearer credential
    pub fn with_credential(mut self, credential: Option<ApiCredential>) -> Self {
        self.credential = credential;
        self
    }

    /// Timeout reported in `CollaboratorError::Timeout` when the client times out
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn build_body(&self, request: &ModelRequest) -> Value {
        let mut messages = Vec::new();
        if !request.system.is_empty() {
            messages.push(json!({"role": "system", "content": request.system}));
        }

        let user_content = if request.images.is_empty() {
            json!(request.prompt)
        } else {
            let mut parts = vec![json!({"type": "text", "text": request.prompt})];
            for image in &request.images {
                let url = format!("data:{};base64,{}", image.media_type, STANDARD.encode(&image.data));
                parts.push(json!({"type": "image_url", "image_url": {"url": url}}));
            }
            Value::Array(parts)
        };
        messages.push(json!({"role": "user", "content": user_content}));

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0,
            "response_format": {"type": "json_object"},
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleProvider {
    async fn generate(&self, request: &ModelRequest) -> Result<String, CollaboratorError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let mut builder = self.client.post(&url).json(&self.build_body(request));
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let response = builder
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CollaboratorError::InvalidResponse("Response contained no choices".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
