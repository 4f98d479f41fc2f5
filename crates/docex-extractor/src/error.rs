//! Error types for the Extractor

use docex_domain::CollaboratorError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Model (or OCR) service could not be used
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A collaborator call exceeded its timeout
    #[error("Extraction call timed out after {0}ms")]
    Timeout(u64),

    /// Model answer violated the response contract
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    /// The chosen strategy cannot run on this document
    #[error("Strategy '{strategy}' cannot run: {detail}")]
    StrategyInapplicable {
        /// Strategy that was selected
        strategy: &'static str,
        /// What the document lacks
        detail: String,
    },
}

impl ExtractionError {
    /// Stable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::ModelUnavailable(_) => "model_unavailable",
            ExtractionError::Timeout(_) => "timeout",
            ExtractionError::MalformedModelOutput(_) => "malformed_model_output",
            ExtractionError::StrategyInapplicable { .. } => "strategy_inapplicable",
        }
    }

    /// Whether the whole extraction may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractionError::ModelUnavailable(_) | ExtractionError::Timeout(_)
        )
    }
}

impl From<CollaboratorError> for ExtractionError {
    fn from(e: CollaboratorError) -> Self {
        match e {
            CollaboratorError::Timeout(ms) => ExtractionError::Timeout(ms),
            CollaboratorError::InvalidResponse(msg) => ExtractionError::MalformedModelOutput(msg),
            other => ExtractionError::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(e: serde_json::Error) -> Self {
        ExtractionError::MalformedModelOutput(format!("JSON parse error: {}", e))
    }
}
