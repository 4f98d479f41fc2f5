//! Process-wide collaborator pool
//!
//! Built once at startup around one shared HTTP client and injected into the
//! orchestrator, so connections are reused across requests without ambient
//! global state.

use crate::error::ConfigError;
use crate::settings::{ModelProvider, Settings};
use docex_domain::{LanguageModel, OcrEngine};
use docex_llm::{ApiCredential, HttpOcrClient, OllamaProvider, OpenAiCompatibleProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Handles to every external collaborator
#[derive(Clone)]
pub struct Collaborators {
    /// Text extraction model
    pub text_model: Arc<dyn LanguageModel>,
    /// Image-grounded extraction model
    pub vision_model: Arc<dyn LanguageModel>,
    /// Lightweight verification model
    pub validation_model: Arc<dyn LanguageModel>,
    /// OCR engine, `None` when not configured
    pub ocr: Option<Arc<dyn OcrEngine>>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("text_model", &self.text_model.name())
            .field("vision_model", &self.vision_model.name())
            .field("validation_model", &self.validation_model.name())
            .field("ocr", &self.ocr.is_some())
            .finish()
    }
}

impl Collaborators {
    /// Pool from explicit handles
    pub fn new(
        text_model: Arc<dyn LanguageModel>,
        vision_model: Arc<dyn LanguageModel>,
        validation_model: Arc<dyn LanguageModel>,
        ocr: Option<Arc<dyn OcrEngine>>,
    ) -> Self {
        Self {
            text_model,
            vision_model,
            validation_model,
            ocr,
        }
    }

    /// Build HTTP-backed collaborators from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let models = &settings.models;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(models.request_timeout_ms))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let credential = models.api_key_env.as_deref().and_then(|var| {
            let credential = ApiCredential::from_env(var);
            if credential.is_none() {
                warn!(var, "API key environment variable is not set");
            }
            credential
        });

        let validation_endpoint = models.validation_endpoint.as_deref().unwrap_or(&models.endpoint);
        let build = |endpoint: &str, model: &str| -> Arc<dyn LanguageModel> {
            match models.provider {
                ModelProvider::Ollama => Arc::new(
                    OllamaProvider::new(client.clone(), endpoint, model)
                        .with_max_attempts(models.max_attempts)
                        .with_timeout_ms(models.request_timeout_ms),
                ),
                ModelProvider::OpenAi => Arc::new(
                    OpenAiCompatibleProvider::new(client.clone(), endpoint, model)
                        .with_credential(credential.clone())
                        .with_timeout_ms(models.request_timeout_ms),
                ),
            }
        };

        let ocr = settings.ocr.endpoint.as_deref().map(|endpoint| {
            Arc::new(HttpOcrClient::new(client.clone(), endpoint).with_timeout_ms(models.request_timeout_ms))
                as Arc<dyn OcrEngine>
        });

        let pool = Self::new(
            build(&models.endpoint, &models.extraction_model),
            build(&models.endpoint, &models.vision_model),
            build(validation_endpoint, &models.validation_model),
            ocr,
        );
        info!(
            provider = ?models.provider,
            extraction_model = %models.extraction_model,
            vision_model = %models.vision_model,
            validation_model = %models.validation_model,
            ocr = pool.ocr.is_some(),
            "Collaborator pool initialized"
        );
        Ok(pool)
    }

    /// Release the pool
    ///
    /// In-flight requests keep their own handles; the shared client closes
    /// once the last one is dropped.
    pub fn shutdown(self) {
        info!("Collaborator pool released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_without_ocr() {
        let pool = Collaborators::from_settings(&Settings::default()).unwrap();
        assert!(pool.ocr.is_none());
        assert_eq!(pool.text_model.name(), "llama3.2");
        assert_eq!(pool.vision_model.name(), "llava");
        assert_eq!(pool.validation_model.name(), "llama3.2:1b");
        pool.shutdown();
    }

    #[test]
    fn test_from_settings_with_ocr_and_openai() {
        let mut settings = Settings::default();
        settings.ocr.endpoint = Some("http://localhost:8866".to_string());
        settings.models.provider = ModelProvider::OpenAi;
        settings.models.api_key_env = Some("DOCEX_TEST_KEY_THAT_IS_NOT_SET".to_string());

        let pool = Collaborators::from_settings(&settings).unwrap();
        assert!(pool.ocr.is_some());
        assert!(format!("{:?}", pool).contains("ocr: true"));
    }
}
