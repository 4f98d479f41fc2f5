//! HTTP OCR client
//!
//! Talks to a document-analysis service exposing `GET /health` and
//! `POST /ocr`. The request carries one page (or the whole document plus a
//! page index) base64-encoded; the response is the recognized text with an
//! optional line layout.

use crate::{classify_status, classify_transport_error};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use docex_domain::{CollaboratorError, OcrEngine, OcrInput, OcrLine, OcrPage};
use serde::{Deserialize, Serialize};

/// OCR service client
pub struct HttpOcrClient {
    endpoint: String,
    client: reqwest::Client,
    timeout_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrRequestBody<'a> {
    page_index: usize,
    media_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct OcrResponseBody {
    text: String,
    #[serde(default)]
    lines: Vec<OcrLineBody>,
}

#[derive(Deserialize)]
struct OcrLineBody {
    text: String,
    #[serde(default)]
    location: Option<String>,
}

impl HttpOcrClient {
    /// Create a client sharing the given HTTP client
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            timeout_ms: 0,
        }
    }

    /// Timeout reported in `CollaboratorError::Timeout` when the client times out
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[async_trait]
impl OcrEngine for HttpOcrClient {
    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, "OCR health probe failed: {}", e);
                false
            }
        }
    }

    async fn recognize(&self, input: &OcrInput) -> Result<OcrPage, CollaboratorError> {
        let url = format!("{}/ocr", self.endpoint);
        let body = OcrRequestBody {
            page_index: input.page_index,
            media_type: &input.media_type,
            data: STANDARD.encode(&input.data),
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

        let parsed: OcrResponseBody = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(format!("Failed to parse OCR response: {}", e)))?;

        Ok(OcrPage {
            page_index: input.page_index,
            text: parsed.text,
            lines: parsed
                .lines
                .into_iter()
                .map(|l| OcrLine {
                    text: l.text,
                    location: l.location.unwrap_or_default(),
                })
                .collect(),
        })
    }
}
