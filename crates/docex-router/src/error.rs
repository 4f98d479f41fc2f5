//! Error types for routing

use thiserror::Error;

/// Routing failures
///
/// All routing failures are terminal for the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The chosen strategy needs OCR and the OCR service is unavailable
    #[error("OCR is required for this document but the OCR service is unavailable ({rationale})")]
    OcrUnavailable {
        /// Rationale of the rule that demanded OCR
        rationale: String,
    },
}

impl RoutingError {
    /// Stable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            RoutingError::OcrUnavailable { .. } => "ocr_unavailable",
        }
    }
}
