//! Strategy identifiers and the immutable routing decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extraction method chosen for a request
///
/// A closed set: the extractor matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Text-only language model over the extracted text layer
    TextLlm,
    /// Image-grounded language model over page images
    VisionLlm,
    /// OCR every page first, then proceed as text
    OcrThenLlm,
}

impl StrategyId {
    /// Get the strategy identifier as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::TextLlm => "text_llm",
            StrategyId::VisionLlm => "vision_llm",
            StrategyId::OcrThenLlm => "ocr_then_llm",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The routing decision for one request
///
/// Exactly one per request; never re-evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDecision {
    /// Chosen strategy
    pub strategy_id: StrategyId,

    /// Human-readable rule and signals that produced the choice
    pub rationale: String,

    /// When the decision was made
    pub decided_at: DateTime<Utc>,
}

impl StrategyDecision {
    /// Record a decision made now
    pub fn new(strategy_id: StrategyId, rationale: impl Into<String>) -> Self {
        Self {
            strategy_id,
            rationale: rationale.into(),
            decided_at: Utc::now(),
        }
    }
}
