//! Extraction candidates, their evidence, and validator verdicts

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Evidence supporting an extracted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Zero-based page (or section) index
    pub page_index: usize,

    /// Approximate location on the page ("header", "table row 3", ...)
    pub location_hint: String,

    /// Verbatim supporting text
    pub snippet_text: String,
}

/// A candidate value for one requested field
///
/// A present value always carries evidence with a non-empty snippet.
/// Construct through [`FieldCandidate::new`] or [`FieldCandidate::absent`]
/// to keep that true.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate {
    /// Field this candidate answers
    pub field_name: String,

    /// Typed value, or `None` when the field was not found
    pub value: Option<Value>,

    /// Supporting evidence, `None` when absent
    pub evidence: Option<Evidence>,
}

impl FieldCandidate {
    /// A field with no discoverable evidence
    pub fn absent(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            value: None,
            evidence: None,
        }
    }

    /// Build a candidate, downgrading to absent unless both a non-null value
    /// and a non-blank snippet are supplied
    pub fn new(field_name: impl Into<String>, value: Option<Value>, evidence: Option<Evidence>) -> Self {
        let field_name = field_name.into();
        match (value, evidence) {
            (Some(value), Some(evidence))
                if !value.is_null() && !evidence.snippet_text.trim().is_empty() =>
            {
                Self {
                    field_name,
                    value: Some(value),
                    evidence: Some(evidence),
                }
            }
            _ => Self::absent(field_name),
        }
    }

    /// Whether a value was found
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Length of the supporting snippet (0 when absent)
    pub fn snippet_len(&self) -> usize {
        self.evidence
            .as_ref()
            .map(|e| e.snippet_text.trim().chars().count())
            .unwrap_or(0)
    }
}

/// Why the validator assigned a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Evidence clearly supports the value
    StrongMatch,
    /// Evidence partially or ambiguously supports the value
    WeakMatch,
    /// No evidence was found
    NoEvidence,
    /// Evidence contradicts the value
    Contradicted,
}

impl ReasonCode {
    /// Get the reason code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::StrongMatch => "strong_match",
            ReasonCode::WeakMatch => "weak_match",
            ReasonCode::NoEvidence => "no_evidence",
            ReasonCode::Contradicted => "contradicted",
        }
    }

    /// Parse a reason code, accepting spaces or hyphens in place of underscores
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "strong_match" => Some(ReasonCode::StrongMatch),
            "weak_match" => Some(ReasonCode::WeakMatch),
            "no_evidence" => Some(ReasonCode::NoEvidence),
            "contradicted" => Some(ReasonCode::Contradicted),
            _ => None,
        }
    }
}

/// Validator verdict for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfidence {
    /// Field this verdict applies to (the map key on the wire)
    #[serde(skip)]
    pub field_name: String,

    /// Confidence in [0, 1]
    pub score: f64,

    /// Reason for the score
    pub reason_code: ReasonCode,

    /// Whether the field passes its threshold gate
    pub passed: bool,
}

impl FieldConfidence {
    /// Verdict for a field with no candidate value
    pub fn no_evidence(field_name: impl Into<String>, required: bool) -> Self {
        Self {
            field_name: field_name.into(),
            score: 0.0,
            reason_code: ReasonCode::NoEvidence,
            passed: !required,
        }
    }
}
