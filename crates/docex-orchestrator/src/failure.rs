//! Phase tagging and remediation hints

use crate::error::IntakeError;
use docex_domain::{ErrorRecord, FileType, Phase};
use docex_extractor::ExtractionError;
use docex_normalizer::PayloadError;
use docex_router::RoutingError;
use docex_validator::ValidationPhaseError;

/// A stage failure tagged with the phase that raised it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseFailure {
    /// Originating phase
    pub phase: Phase,
    /// Stable reason code
    pub reason: &'static str,
    /// Human-readable description
    pub message: String,
    /// What the caller can do about it
    pub remediation: String,
}

impl PhaseFailure {
    /// Create a failure
    pub fn new(phase: Phase, reason: &'static str, message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            phase,
            reason,
            message: message.into(),
            remediation: remediation.into(),
        }
    }

    /// Convert to the wire record
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord::new(self.phase, self.reason, self.message.clone()).with_remediation(self.remediation.clone())
    }
}

impl From<IntakeError> for PhaseFailure {
    fn from(e: IntakeError) -> Self {
        let remediation = match &e {
            IntakeError::MissingPayload => "Supply documentBase64 with the document content".to_string(),
            IntakeError::EmptyFieldSet => "Supply at least one entry in dataElements".to_string(),
            IntakeError::EmptyFieldName(_) => "Give every data element a non-empty name".to_string(),
            IntakeError::DuplicateFieldName(name) => format!("Rename or remove the repeated data element '{}'", name),
        };
        Self::new(Phase::Intake, e.reason(), e.to_string(), remediation)
    }
}

impl From<PayloadError> for PhaseFailure {
    fn from(e: PayloadError) -> Self {
        let remediation = match &e {
            PayloadError::Malformed(_) => {
                "Verify the payload is valid base64 of a document matching fileType".to_string()
            }
            PayloadError::Oversize { limit, .. } => {
                format!("Reduce the document below {} bytes or raise max_payload_mb", limit)
            }
            PayloadError::UnsupportedType(_) => format!("Use one of: {}", FileType::supported_list()),
        };
        Self::new(Phase::Classifying, e.reason(), e.to_string(), remediation)
    }
}

impl From<RoutingError> for PhaseFailure {
    fn from(e: RoutingError) -> Self {
        Self::new(
            Phase::Routing,
            e.reason(),
            e.to_string(),
            "Start or configure the OCR service, or submit a digital document with a text layer",
        )
    }
}

impl From<ExtractionError> for PhaseFailure {
    fn from(e: ExtractionError) -> Self {
        let remediation = match &e {
            ExtractionError::ModelUnavailable(_) => "Check that the model service is reachable, then resubmit",
            ExtractionError::Timeout(_) => "Resubmit later or raise the extractor call timeout",
            ExtractionError::MalformedModelOutput(_) => {
                "The model ignored the response format; resubmit or configure a more capable model"
            }
            ExtractionError::StrategyInapplicable { .. } => {
                "Check that fileType matches the document content, then resubmit"
            }
        };
        Self::new(Phase::Extracting, e.reason(), e.to_string(), remediation)
    }
}

impl From<ValidationPhaseError> for PhaseFailure {
    fn from(e: ValidationPhaseError) -> Self {
        let remediation = match &e {
            ValidationPhaseError::EmptyFieldSet => "Supply at least one entry in dataElements".to_string(),
            ValidationPhaseError::ZeroConfidenceRequiredField(fields) => format!(
                "Required field {} not found; verify the document contains this data or mark the field optional",
                fields.join(", ")
            ),
            ValidationPhaseError::ModelUnavailable(_) => {
                "Check that the validation model service is reachable, then resubmit".to_string()
            }
            ValidationPhaseError::Timeout(_) => "Resubmit later or raise the validator call timeout".to_string(),
            ValidationPhaseError::MalformedOutput(_) => {
                "The validation model ignored the response format; configure a more capable model".to_string()
            }
        };
        Self::new(Phase::Validating, e.reason(), e.to_string(), remediation)
    }
}

/// Soft failure for a required field that scored below its threshold
pub fn below_threshold(field: &str, score: f64, threshold: f64) -> ErrorRecord {
    ErrorRecord::new(
        Phase::Validating,
        "below_threshold",
        format!("Required field '{}' scored {:.2}, below the {:.2} threshold", field, score, threshold),
    )
    .with_remediation(format!(
        "Lower the confidence threshold or verify the document contains a clear value for '{}'",
        field
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_tags() {
        assert_eq!(PhaseFailure::from(IntakeError::EmptyFieldSet).phase, Phase::Intake);
        assert_eq!(
            PhaseFailure::from(PayloadError::UnsupportedType("gif".to_string())).phase,
            Phase::Classifying
        );
        assert_eq!(
            PhaseFailure::from(ExtractionError::Timeout(10)).phase,
            Phase::Extracting
        );
        assert_eq!(
            PhaseFailure::from(ValidationPhaseError::EmptyFieldSet).phase,
            Phase::Validating
        );
    }

    #[test]
    fn test_record_carries_reason_and_remediation() {
        let record = PhaseFailure::from(ValidationPhaseError::ZeroConfidenceRequiredField(vec![
            "invoiceNumber".to_string(),
        ]))
        .to_record();
        assert_eq!(record.reason, "zero_confidence_required_field");
        assert!(record
            .remediation
            .unwrap()
            .starts_with("Required field invoiceNumber not found"));
    }

    #[test]
    fn test_inapplicable_strategy_is_an_extracting_failure() {
        let failure = PhaseFailure::from(ExtractionError::StrategyInapplicable {
            strategy: "vision_llm",
            detail: "document has no page images".to_string(),
        });
        assert_eq!(failure.phase, Phase::Extracting);
        assert_eq!(failure.reason, "strategy_inapplicable");
        assert!(failure.message.contains("vision_llm"));
    }

    #[test]
    fn test_unsupported_type_lists_types() {
        let failure = PhaseFailure::from(PayloadError::UnsupportedType("gif".to_string()));
        assert_eq!(failure.remediation, "Use one of: pdf, docx, png, jpg");
    }

    #[test]
    fn test_below_threshold_record() {
        let record = below_threshold("total", 0.61, 0.8);
        assert_eq!(record.phase, Phase::Validating);
        assert_eq!(record.message, "Required field 'total' scored 0.61, below the 0.80 threshold");
    }
}
