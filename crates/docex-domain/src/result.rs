//! Response root and phase-tagged error records

use crate::{ClassificationMetadata, Evidence, FieldConfidence, FileType, ImageQuality, StrategyDecision};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Pipeline stage in which a failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Request shape checks before any collaborator is touched
    Intake,
    /// Payload decoding and classification
    Classifying,
    /// Strategy selection
    Routing,
    /// Field extraction
    Extracting,
    /// Confidence scoring
    Validating,
    /// Result assembly
    Assembling,
}

impl Phase {
    /// Get the phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Intake => "intake",
            Phase::Classifying => "classifying",
            Phase::Routing => "routing",
            Phase::Extracting => "extracting",
            Phase::Validating => "validating",
            Phase::Assembling => "assembling",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure, tagged with the phase it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Originating phase
    pub phase: Phase,

    /// Stable machine-readable reason code
    pub reason: String,

    /// Human-readable description
    pub message: String,

    /// What the caller can do about it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorRecord {
    /// Create an error record
    pub fn new(phase: Phase, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phase,
            reason: reason.into(),
            message: message.into(),
            remediation: None,
        }
    }

    /// Attach a remediation hint
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

/// Classification subset reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    /// Normalized file type
    pub file_type: FileType,
    /// Scan detection outcome
    pub is_scanned: bool,
    /// Text density signal
    pub text_density: f64,
    /// Raster quality estimate
    pub image_quality: ImageQuality,
}

impl From<&ClassificationMetadata> for DocumentType {
    fn from(meta: &ClassificationMetadata) -> Self {
        Self {
            file_type: meta.file_type,
            is_scanned: meta.is_scanned,
            text_density: meta.text_density,
            image_quality: meta.image_quality,
        }
    }
}

/// Final response for one request
///
/// Built once during assembly and never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// True iff no hard failure occurred and every required field passed
    pub success: bool,

    /// Classification subset, when classification completed
    pub document_type: Option<DocumentType>,

    /// Routing decision, when routing completed
    pub extraction_strategy: Option<StrategyDecision>,

    /// Field name to value; absent fields are omitted
    pub extracted_data: BTreeMap<String, Value>,

    /// Field name to validator verdict
    pub confidence_per_field: BTreeMap<String, FieldConfidence>,

    /// Mean of per-field scores, when validation ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f64>,

    /// Field name to supporting evidence
    pub provenance: BTreeMap<String, Evidence>,

    /// Phase-tagged errors, `null` when there are none
    pub errors: Option<Vec<ErrorRecord>>,
}

impl ExtractionResult {
    /// Phase of the first recorded error, if any
    pub fn failed_phase(&self) -> Option<Phase> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|e| e.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_errors_serialize_as_null() {
        let result = ExtractionResult {
            success: true,
            document_type: None,
            extraction_strategy: None,
            extracted_data: BTreeMap::new(),
            confidence_per_field: BTreeMap::new(),
            overall_confidence: None,
            provenance: BTreeMap::new(),
            errors: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errors"], Value::Null);
        assert_eq!(json["extractedData"], json!({}));
        assert!(json.get("overallConfidence").is_none());
        assert_eq!(result.failed_phase(), None);
    }

    #[test]
    fn test_error_record_wire_shape() {
        let record = ErrorRecord::new(Phase::Routing, "ocr_unavailable", "OCR service is down")
            .with_remediation("retry later");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["phase"], "routing");
        assert_eq!(json["reason"], "ocr_unavailable");
        assert_eq!(json["remediation"], "retry later");
    }
}
