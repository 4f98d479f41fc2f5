//! Payload to normalized document

use crate::config::NormalizerConfig;
use crate::decode::{decode_payload, parse_file_type, verify_signature};
use crate::error::Result;
use crate::types::NormalizedDocument;
use crate::{docx, pdf, raster};
use docex_domain::{DocumentPayload, FileType};

/// Decodes payloads and computes classification signals
///
/// Stateless apart from its read-only configuration.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with the given configuration
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Decode `payload` as `declared_type` and classify it
    ///
    /// # Errors
    ///
    /// - `UnsupportedType` when the declared type is not pdf, docx, png or jpg
    /// - `Oversize` when the payload exceeds the configured limit
    /// - `Malformed` when the payload does not decode as the declared type
    pub fn normalize(&self, payload: &DocumentPayload, declared_type: &str) -> Result<NormalizedDocument> {
        let file_type = parse_file_type(declared_type)?;
        let bytes = decode_payload(payload, self.config.max_payload_bytes)?;
        verify_signature(&bytes, file_type)?;

        tracing::debug!(file_type = %file_type, size = bytes.len(), "Normalizing document");

        match file_type {
            FileType::Pdf => pdf::normalize_pdf(bytes, &self.config),
            FileType::Docx => docx::normalize_docx(&bytes, &self.config),
            FileType::Png | FileType::Jpg => raster::normalize_image(bytes, file_type, &self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayloadError;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn test_unsupported_type_checked_first() {
        let normalizer = Normalizer::default();
        let err = normalizer
            .normalize(&DocumentPayload::Base64("???".to_string()), "gif")
            .unwrap_err();
        assert_eq!(err, PayloadError::UnsupportedType("gif".to_string()));
    }

    #[test]
    fn test_declared_type_mismatch_is_malformed() {
        let pdf = crate::pdf::tests::make_pdf(&["hello"]);
        let err = Normalizer::default()
            .normalize(&DocumentPayload::Bytes(pdf), "png")
            .unwrap_err();
        assert_eq!(err.reason(), "malformed");
    }

    #[test]
    fn test_base64_pdf_end_to_end() {
        let text = crate::pdf::tests::dense_text("Invoice Number INV-7");
        let pdf = crate::pdf::tests::make_pdf(&[&text]);
        let payload = DocumentPayload::Base64(STANDARD.encode(&pdf));

        let doc = Normalizer::default().normalize(&payload, " PDF ").unwrap();
        assert_eq!(doc.classification.file_type, FileType::Pdf);
        assert!(doc.char_count() > 0);
    }

    #[test]
    fn test_configured_limit_applies() {
        let config = NormalizerConfig {
            max_payload_bytes: 16,
            ..NormalizerConfig::default()
        };
        let err = Normalizer::new(config)
            .normalize(&DocumentPayload::Bytes(vec![b'x'; 32]), "pdf")
            .unwrap_err();
        assert!(matches!(err, PayloadError::Oversize { size: 32, limit: 16 }));
    }
}
