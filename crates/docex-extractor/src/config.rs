//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Timeout for the extraction model call (milliseconds)
    pub call_timeout_ms: u64,

    /// Timeout for each per-page OCR call (milliseconds)
    pub ocr_timeout_ms: u64,

    /// Maximum concurrent OCR calls per request
    pub ocr_concurrency: usize,

    /// Maximum document characters sent to the model
    pub max_document_chars: usize,

    /// Maximum page images attached to a vision call
    pub max_images: usize,

    /// Optional system prompt template; `{elements}` is replaced by the field list
    pub prompt_template: Option<String>,
}

impl ExtractorConfig {
    /// Get the model call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Get the OCR call timeout as a Duration
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.call_timeout_ms == 0 {
            return Err("call_timeout_ms must be greater than 0".to_string());
        }
        if self.ocr_timeout_ms == 0 {
            return Err("ocr_timeout_ms must be greater than 0".to_string());
        }
        if self.ocr_concurrency == 0 {
            return Err("ocr_concurrency must be greater than 0".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.max_images == 0 {
            return Err("max_images must be greater than 0".to_string());
        }
        if let Some(template) = &self.prompt_template {
            if !template.contains("{elements}") {
                return Err("prompt_template must contain an {elements} placeholder".to_string());
            }
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            call_timeout_ms: 60_000,
            ocr_timeout_ms: 30_000,
            ocr_concurrency: 4,
            max_document_chars: 100_000,
            max_images: 10,
            prompt_template: None,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeouts, less content per call
    pub fn aggressive() -> Self {
        Self {
            call_timeout_ms: 20_000,
            ocr_timeout_ms: 10_000,
            ocr_concurrency: 8,
            max_document_chars: 40_000,
            max_images: 4,
            prompt_template: None,
        }
    }

    /// Lenient preset: longer timeouts for slow local models
    pub fn lenient() -> Self {
        Self {
            call_timeout_ms: 180_000,
            ocr_timeout_ms: 90_000,
            ocr_concurrency: 2,
            max_document_chars: 200_000,
            max_images: 20,
            prompt_template: None,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
