//! Ordered routing policy

use crate::RoutingError;
use docex_domain::{ClassificationMetadata, StrategyDecision, StrategyId};

/// One routing rule, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingRule {
    /// The document has no usable text layer
    ScannedDocument,
    /// The document is a single raster image
    RasterImage,
    /// Digital PDF or DOCX
    DigitalText,
}

impl RoutingRule {
    /// Rules in evaluation order
    pub const ORDER: [RoutingRule; 3] = [
        RoutingRule::ScannedDocument,
        RoutingRule::RasterImage,
        RoutingRule::DigitalText,
    ];

    /// Whether the rule applies to these signals
    pub fn matches(&self, classification: &ClassificationMetadata) -> bool {
        match self {
            RoutingRule::ScannedDocument => classification.is_scanned,
            RoutingRule::RasterImage => classification.file_type.is_image(),
            RoutingRule::DigitalText => true,
        }
    }

    /// Strategy selected by this rule
    pub fn strategy(&self) -> StrategyId {
        match self {
            RoutingRule::ScannedDocument => StrategyId::OcrThenLlm,
            RoutingRule::RasterImage => StrategyId::VisionLlm,
            RoutingRule::DigitalText => StrategyId::TextLlm,
        }
    }

    /// Human-readable rule name
    pub fn label(&self) -> &'static str {
        match self {
            RoutingRule::ScannedDocument => "rule 1 (scanned document)",
            RoutingRule::RasterImage => "rule 2 (raster image)",
            RoutingRule::DigitalText => "rule 3 (digital text)",
        }
    }
}

/// Selects the extraction strategy for a request
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyRouter;

impl StrategyRouter {
    /// Create a router
    pub fn new() -> Self {
        Self
    }

    /// First rule matching the classification
    pub fn matching_rule(&self, classification: &ClassificationMetadata) -> RoutingRule {
        RoutingRule::ORDER
            .into_iter()
            .find(|rule| rule.matches(classification))
            .unwrap_or(RoutingRule::DigitalText)
    }

    /// Decide the strategy
    ///
    /// `ocr_available` is the OCR collaborator's state at decision time.
    ///
    /// # Errors
    ///
    /// `OcrUnavailable` when the document is scanned and OCR cannot be used.
    pub fn decide(
        &self,
        classification: &ClassificationMetadata,
        ocr_available: bool,
    ) -> Result<StrategyDecision, RoutingError> {
        let rule = self.matching_rule(classification);
        let strategy = rule.strategy();
        let rationale = format!(
            "{}: fileType={}, isScanned={}, textDensity={:.1}, imageQuality={}, pages={} -> {}",
            rule.label(),
            classification.file_type,
            classification.is_scanned,
            classification.text_density,
            classification.image_quality.as_str(),
            classification.page_count,
            strategy,
        );

        if strategy == StrategyId::OcrThenLlm && !ocr_available {
            tracing::warn!(file_type = %classification.file_type, "Scanned document but OCR unavailable");
            return Err(RoutingError::OcrUnavailable { rationale });
        }

        tracing::info!(strategy = %strategy, rule = rule.label(), "Strategy selected");
        Ok(StrategyDecision::new(strategy, rationale))
    }
}
