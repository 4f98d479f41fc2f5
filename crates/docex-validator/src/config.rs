//! Validation configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for confidence validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum score a required field needs to pass
    pub min_confidence_threshold: f64,

    /// Per-field threshold overrides, keyed by field name
    pub field_thresholds: BTreeMap<String, f64>,

    /// Timeout for each verification call (milliseconds)
    pub call_timeout_ms: u64,

    /// Maximum verification calls in flight per request
    pub max_concurrent_calls: usize,

    /// Maximum snippet characters sent per call
    pub max_snippet_chars: usize,

    /// Maximum page-context characters sent per call
    pub max_context_chars: usize,

    /// Optional system prompt template for verification calls
    pub prompt_template: Option<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: 0.8,
            field_thresholds: BTreeMap::new(),
            call_timeout_ms: 30_000,
            max_concurrent_calls: 8,
            max_snippet_chars: 1_000,
            max_context_chars: 5_000,
            prompt_template: None,
        }
    }
}

impl ValidationConfig {
    /// Strict preset: higher bar for required fields
    pub fn strict() -> Self {
        Self {
            min_confidence_threshold: 0.9,
            ..Self::default()
        }
    }

    /// Permissive preset: lower bar for required fields
    pub fn permissive() -> Self {
        Self {
            min_confidence_threshold: 0.5,
            ..Self::default()
        }
    }

    /// Threshold that applies to `field`
    pub fn threshold_for(&self, field: &str) -> f64 {
        self.field_thresholds
            .get(field)
            .copied()
            .unwrap_or(self.min_confidence_threshold)
    }

    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let in_range = |t: f64| (0.0..=1.0).contains(&t);
        if !in_range(self.min_confidence_threshold) {
            return Err("min_confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if let Some((name, _)) = self.field_thresholds.iter().find(|(_, t)| !in_range(**t)) {
            return Err(format!("field_thresholds.{} must be between 0.0 and 1.0", name));
        }
        if self.call_timeout_ms == 0 {
            return Err("call_timeout_ms must be greater than 0".to_string());
        }
        if self.max_concurrent_calls == 0 {
            return Err("max_concurrent_calls must be greater than 0".to_string());
        }
        if self.max_snippet_chars == 0 {
            return Err("max_snippet_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ValidationConfig::default().validate().is_ok());
        assert!(ValidationConfig::strict().validate().is_ok());
        assert!(ValidationConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = ValidationConfig {
            min_confidence_threshold: 1.5,
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_field_override() {
        let config = ValidationConfig::from_toml(
            "min_confidence_threshold = 0.7\n[field_thresholds]\ntotal = 0.95\n",
        )
        .unwrap();
        assert_eq!(config.threshold_for("total"), 0.95);
        assert_eq!(config.threshold_for("other"), 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_field_override_named() {
        let mut config = ValidationConfig::default();
        config.field_thresholds.insert("total".to_string(), -0.1);
        assert_eq!(
            config.validate().unwrap_err(),
            "field_thresholds.total must be between 0.0 and 1.0"
        );
    }
}
