//! Validator error types

use docex_domain::FieldConfidence;
use thiserror::Error;

/// Hard validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationPhaseError {
    /// The request named no fields
    #[error("No fields were requested")]
    EmptyFieldSet,

    /// Required fields with no evidence at all
    #[error("Required field(s) not found: {}", .0.join(", "))]
    ZeroConfidenceRequiredField(Vec<String>),

    /// Validation model could not be used
    #[error("Validation model unavailable: {0}")]
    ModelUnavailable(String),

    /// A verification call exceeded its timeout
    #[error("Validation call timed out after {0}ms")]
    Timeout(u64),

    /// Validation model answered outside the response contract
    #[error("Malformed validation output: {0}")]
    MalformedOutput(String),
}

impl ValidationPhaseError {
    /// Stable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationPhaseError::EmptyFieldSet => "empty_field_set",
            ValidationPhaseError::ZeroConfidenceRequiredField(_) => "zero_confidence_required_field",
            ValidationPhaseError::ModelUnavailable(_) => "validation_model_unavailable",
            ValidationPhaseError::Timeout(_) => "timeout",
            ValidationPhaseError::MalformedOutput(_) => "malformed_validation_output",
        }
    }
}

/// A hard failure plus whatever confidences were computed before it
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ValidationFailure {
    /// What went wrong
    pub error: ValidationPhaseError,
    /// Confidences computed so far, in field order
    pub confidences: Vec<FieldConfidence>,
}

impl ValidationFailure {
    /// Failure with no computed confidences
    pub fn bare(error: ValidationPhaseError) -> Self {
        Self {
            error,
            confidences: Vec::new(),
        }
    }
}

impl From<docex_domain::CollaboratorError> for ValidationPhaseError {
    fn from(e: docex_domain::CollaboratorError) -> Self {
        use docex_domain::CollaboratorError;
        match e {
            CollaboratorError::Timeout(ms) => ValidationPhaseError::Timeout(ms),
            CollaboratorError::InvalidResponse(msg) => ValidationPhaseError::MalformedOutput(msg),
            other => ValidationPhaseError::ModelUnavailable(other.to_string()),
        }
    }
}
