//! Configuration for document normalization

use serde::{Deserialize, Serialize};

/// Normalizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Maximum decoded payload size in bytes
    pub max_payload_bytes: usize,

    /// Characters per letter-page below which a paged document counts as scanned
    pub text_density_threshold: f64,

    /// Images with fewer pixels than this are rated poor quality
    pub low_resolution_pixels: u64,

    /// Grayscale standard deviation below which contrast is rated poor
    pub low_contrast_stddev: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 10 * 1024 * 1024,
            text_density_threshold: 100.0,
            low_resolution_pixels: 500_000,
            low_contrast_stddev: 20.0,
        }
    }
}

impl NormalizerConfig {
    /// Set the payload limit in mebibytes
    pub fn with_max_payload_mb(mut self, mb: usize) -> Self {
        self.max_payload_bytes = mb * 1024 * 1024;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_payload_bytes == 0 {
            return Err("max_payload_bytes must be greater than 0".to_string());
        }
        if self.max_payload_bytes > 100 * 1024 * 1024 {
            return Err("max_payload_bytes must not exceed 100 MiB".to_string());
        }
        if !self.text_density_threshold.is_finite() || self.text_density_threshold < 0.0 {
            return Err("text_density_threshold must be a non-negative number".to_string());
        }
        if self.low_contrast_stddev < 0.0 {
            return Err("low_contrast_stddev must be non-negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NormalizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_payload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_payload_limit_bounds() {
        assert!(NormalizerConfig::default().with_max_payload_mb(0).validate().is_err());
        assert!(NormalizerConfig::default().with_max_payload_mb(101).validate().is_err());
        assert!(NormalizerConfig::default().with_max_payload_mb(100).validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: NormalizerConfig = toml::from_str("text_density_threshold = 50.0").unwrap();
        assert_eq!(config.text_density_threshold, 50.0);
        assert_eq!(config.low_resolution_pixels, 500_000);
    }
}
