//! Process settings
//!
//! Loaded once at startup from TOML, then environment overrides, then shared
//! read-only across requests.

use crate::error::ConfigError;
use docex_extractor::ExtractorConfig;
use docex_normalizer::NormalizerConfig;
use docex_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// `(section, key, pipeline key)` for section keys overwritten from `[pipeline]`
const PIPELINE_OWNED_KEYS: [(&str, &str, &str); 2] = [
    ("validator", "min_confidence_threshold", "min_confidence_threshold"),
    ("normalizer", "max_payload_bytes", "max_payload_mb"),
];

/// Complete settings for one docex process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Request-level knobs
    pub pipeline: PipelineConfig,
    /// Document normalization
    pub normalizer: NormalizerConfig,
    /// Field extraction
    pub extractor: ExtractorConfig,
    /// Confidence validation
    pub validator: ValidationConfig,
    /// Language-model collaborators
    pub models: ModelsConfig,
    /// OCR collaborator
    pub ocr: OcrConfig,
    /// HTTP surface
    pub server: ServerConfig,
}

/// Request-level knobs
///
/// `min_confidence_threshold` and `max_payload_mb` are the only place to set
/// the threshold and payload limit; `[validator]` and `[normalizer]` may not
/// repeat them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Score a required field needs to pass
    pub min_confidence_threshold: f64,
    /// Payload limit in mebibytes
    pub max_payload_mb: usize,
    /// Base backoff before the extraction retry (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: 0.8,
            max_payload_mb: 10,
            retry_backoff_ms: 500,
        }
    }
}

/// Which wire protocol the model endpoints speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Ollama `/api/generate`
    Ollama,
    /// OpenAI-compatible `/chat/completions`
    OpenAi,
}

impl ModelProvider {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Some(ModelProvider::Ollama),
            "openai" | "openai-compatible" => Some(ModelProvider::OpenAi),
            _ => None,
        }
    }
}

/// Language-model collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Wire protocol
    pub provider: ModelProvider,
    /// Base URL of the model service
    pub endpoint: String,
    /// Model for text extraction
    pub extraction_model: String,
    /// Model for image-grounded extraction
    pub vision_model: String,
    /// Lightweight model for verification calls
    pub validation_model: String,
    /// Separate base URL for the validation model, if any
    pub validation_endpoint: Option<String>,
    /// HTTP request timeout (milliseconds)
    pub request_timeout_ms: u64,
    /// Attempts per call inside the provider (Ollama only)
    pub max_attempts: u32,
    /// Environment variable holding the bearer API key
    pub api_key_env: Option<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Ollama,
            endpoint: "http://localhost:11434".to_string(),
            extraction_model: "llama3.2".to_string(),
            vision_model: "llava".to_string(),
            validation_model: "llama3.2:1b".to_string(),
            validation_endpoint: None,
            request_timeout_ms: 120_000,
            max_attempts: 1,
            api_key_env: None,
        }
    }
}

/// OCR collaborator; no endpoint means OCR is unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Base URL of the OCR service
    pub endpoint: Option<String>,
    /// Timeout for the availability probe (milliseconds)
    pub probe_timeout_ms: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            probe_timeout_ms: 2_000,
        }
    }
}

/// HTTP surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub bind_address: String,
    /// Bind port
    pub bind_port: u16,
    /// Name reported by the health endpoint
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            service_name: "docex".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

impl Settings {
    /// Load from a TOML file, apply environment overrides, and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|var| std::env::var(var).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a TOML file without overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse from a TOML string
    ///
    /// Section keys that `[pipeline]` owns are rejected rather than ignored.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(toml_str)?;
        for (section, key, owner) in PIPELINE_OWNED_KEYS {
            let set = table
                .get(section)
                .and_then(toml::Value::as_table)
                .is_some_and(|t| t.contains_key(key));
            if set {
                return Err(ConfigError::Invalid {
                    section,
                    message: format!("{} is set by [pipeline].{}; remove it from [{}]", key, owner, section),
                });
            }
        }
        Ok(toml::from_str(toml_str)?)
    }

    /// Render as TOML, leaving out the section keys `[pipeline]` owns
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let mut value = toml::Value::try_from(self)?;
        for (section, key, _) in PIPELINE_OWNED_KEYS {
            if let Some(table) = value.get_mut(section).and_then(toml::Value::as_table_mut) {
                table.remove(key);
            }
        }
        Ok(toml::to_string_pretty(&value)?)
    }

    /// Apply `DOCEX_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(var: &str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var: var.to_string(), value })
        }

        if let Some(v) = lookup("DOCEX_MIN_CONFIDENCE_THRESHOLD") {
            self.pipeline.min_confidence_threshold = parsed("DOCEX_MIN_CONFIDENCE_THRESHOLD", v)?;
        }
        if let Some(v) = lookup("DOCEX_MAX_PAYLOAD_MB") {
            self.pipeline.max_payload_mb = parsed("DOCEX_MAX_PAYLOAD_MB", v)?;
        }
        if let Some(v) = lookup("DOCEX_MODEL_ENDPOINT") {
            self.models.endpoint = v;
        }
        if let Some(v) = lookup("DOCEX_EXTRACTION_MODEL") {
            self.models.extraction_model = v;
        }
        if let Some(v) = lookup("DOCEX_VISION_MODEL") {
            self.models.vision_model = v;
        }
        if let Some(v) = lookup("DOCEX_VALIDATION_MODEL") {
            self.models.validation_model = v;
        }
        if let Some(v) = lookup("DOCEX_MODEL_PROVIDER") {
            self.models.provider = ModelProvider::parse(&v).ok_or_else(|| ConfigError::InvalidOverride {
                var: "DOCEX_MODEL_PROVIDER".to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("DOCEX_OCR_ENDPOINT") {
            self.ocr.endpoint = Some(v).filter(|e| !e.trim().is_empty());
        }
        if let Some(v) = lookup("DOCEX_SERVER_PORT") {
            self.server.bind_port = parsed("DOCEX_SERVER_PORT", v)?;
        }
        if let Some(v) = lookup("DOCEX_API_KEY_ENV") {
            self.models.api_key_env = Some(v).filter(|e| !e.trim().is_empty());
        }
        Ok(())
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |section: &'static str| move |message: String| ConfigError::Invalid { section, message };

        if !(0.0..=1.0).contains(&self.pipeline.min_confidence_threshold) {
            return Err(invalid("pipeline")(
                "min_confidence_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.pipeline.max_payload_mb == 0 || self.pipeline.max_payload_mb > 100 {
            return Err(invalid("pipeline")("max_payload_mb must be between 1 and 100".to_string()));
        }
        self.normalizer_config().validate().map_err(invalid("normalizer"))?;
        self.extractor.validate().map_err(invalid("extractor"))?;
        self.validation_config().validate().map_err(invalid("validator"))?;

        if self.models.endpoint.trim().is_empty() {
            return Err(invalid("models")("endpoint must not be empty".to_string()));
        }
        for (key, name) in [
            ("extraction_model", &self.models.extraction_model),
            ("vision_model", &self.models.vision_model),
            ("validation_model", &self.models.validation_model),
        ] {
            if name.trim().is_empty() {
                return Err(invalid("models")(format!("{} must not be empty", key)));
            }
        }
        if self.models.request_timeout_ms == 0 {
            return Err(invalid("models")("request_timeout_ms must be greater than 0".to_string()));
        }
        if self.ocr.probe_timeout_ms == 0 {
            return Err(invalid("ocr")("probe_timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Normalizer section with the pipeline payload limit applied
    pub fn normalizer_config(&self) -> NormalizerConfig {
        self.normalizer.clone().with_max_payload_mb(self.pipeline.max_payload_mb)
    }

    /// Validator section with the pipeline threshold applied
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            min_confidence_threshold: self.pipeline.min_confidence_threshold,
            ..self.validator.clone()
        }
    }

    /// Base backoff before the extraction retry
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.pipeline.retry_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.bind_addr(), "127.0.0.1:8080");
        assert!(settings.ocr.endpoint.is_none());
    }

    #[test]
    fn test_pipeline_keys_apply_to_sections() {
        let settings = Settings::from_toml(
            r#"
            [pipeline]
            min_confidence_threshold = 0.6
            max_payload_mb = 2

            [validator]
            max_snippet_chars = 200
            "#,
        )
        .unwrap();

        let validation = settings.validation_config();
        assert_eq!(validation.min_confidence_threshold, 0.6);
        assert_eq!(validation.max_snippet_chars, 200);
        assert_eq!(settings.normalizer_config().max_payload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_section_copy_of_pipeline_key_is_rejected() {
        let err = Settings::from_toml(
            r#"
            [pipeline]
            min_confidence_threshold = 0.6

            [validator]
            min_confidence_threshold = 0.95
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "validator", .. }));

        let err = Settings::from_toml("[normalizer]\nmax_payload_bytes = 1024\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "normalizer", .. }));
    }

    #[test]
    fn test_rendered_toml_loads_back() {
        let mut settings = Settings::default();
        settings.pipeline.min_confidence_threshold = 0.65;
        let rendered = settings.to_toml().unwrap();
        assert!(!rendered.contains("max_payload_bytes"));
        assert_eq!(rendered.matches("min_confidence_threshold").count(), 1);

        let loaded = Settings::from_toml(&rendered).unwrap();
        assert_eq!(loaded.validation_config().min_confidence_threshold, 0.65);
        assert_eq!(loaded.pipeline, settings.pipeline);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(env(&[
                ("DOCEX_MIN_CONFIDENCE_THRESHOLD", "0.7"),
                ("DOCEX_MODEL_PROVIDER", "openai"),
                ("DOCEX_OCR_ENDPOINT", "http://ocr:9000"),
                ("DOCEX_SERVER_PORT", "9090"),
                ("DOCEX_API_KEY_ENV", "MY_KEY"),
            ]))
            .unwrap();

        assert_eq!(settings.pipeline.min_confidence_threshold, 0.7);
        assert_eq!(settings.models.provider, ModelProvider::OpenAi);
        assert_eq!(settings.ocr.endpoint.as_deref(), Some("http://ocr:9000"));
        assert_eq!(settings.server.bind_port, 9090);
        assert_eq!(settings.models.api_key_env.as_deref(), Some("MY_KEY"));
    }

    #[test]
    fn test_bad_override_names_variable() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(env(&[("DOCEX_MAX_PAYLOAD_MB", "lots")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 'lots' for DOCEX_MAX_PAYLOAD_MB");
    }

    #[test]
    fn test_validate_names_section() {
        let mut settings = Settings::default();
        settings.pipeline.min_confidence_threshold = 2.0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("[pipeline]"));

        let mut settings = Settings::default();
        settings.extractor.call_timeout_ms = 0;
        assert!(settings.validate().unwrap_err().to_string().contains("[extractor]"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ocr]\nendpoint = \"http://localhost:8866\"\n[server]\nbind_port = 7000").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.ocr.endpoint.as_deref(), Some("http://localhost:8866"));
        assert_eq!(settings.server.bind_port, 7000);
        assert_eq!(settings.models, ModelsConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings::default();
        let rendered = settings.to_toml().unwrap();
        assert_eq!(Settings::from_toml(&rendered).unwrap(), settings);
    }
}
