//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::ocr::{merge_page_text, recognize_pages};
use crate::parser::parse_extraction_response;
use crate::prompt::PromptBuilder;
use docex_domain::{FieldCandidate, FieldSpec, ImageInput, LanguageModel, ModelRequest, OcrEngine, StrategyId};
use docex_normalizer::NormalizedDocument;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

/// Turns a normalized document into one candidate per requested field
///
/// Every strategy issues exactly one batched model call per invocation.
pub struct FieldExtractor {
    text_model: Arc<dyn LanguageModel>,
    vision_model: Arc<dyn LanguageModel>,
    ocr: Option<Arc<dyn OcrEngine>>,
    config: ExtractorConfig,
}

impl FieldExtractor {
    /// Create an extractor
    pub fn new(
        text_model: Arc<dyn LanguageModel>,
        vision_model: Arc<dyn LanguageModel>,
        ocr: Option<Arc<dyn OcrEngine>>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            text_model,
            vision_model,
            ocr,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract candidates for `fields` using `strategy`
    ///
    /// Returns candidates in field order. Absent fields carry no value and no
    /// evidence.
    pub async fn extract(
        &self,
        strategy: StrategyId,
        document: &NormalizedDocument,
        fields: &[FieldSpec],
    ) -> Result<Vec<FieldCandidate>, ExtractionError> {
        info!(
            strategy = %strategy,
            pages = document.pages.len(),
            fields = fields.len(),
            "Starting extraction"
        );

        let prompt = PromptBuilder::new(fields).with_template(self.config.prompt_template.as_deref());

        let (model, request) = match strategy {
            StrategyId::TextLlm => {
                let texts: Vec<String> = document.pages.iter().map(|p| p.text.clone()).collect();
                (&self.text_model, self.text_request(&prompt, &texts))
            }
            StrategyId::VisionLlm => {
                let images: Vec<ImageInput> = document
                    .pages
                    .iter()
                    .filter_map(|p| p.image.as_ref())
                    .filter(|img| img.is_raster())
                    .take(self.config.max_images)
                    .map(|img| ImageInput {
                        media_type: img.media_type.clone(),
                        data: img.data.as_ref().clone(),
                    })
                    .collect();
                if images.is_empty() {
                    return Err(ExtractionError::StrategyInapplicable {
                        strategy: strategy.as_str(),
                        detail: "document has no page images".to_string(),
                    });
                }
                let request = ModelRequest::text(prompt.system(), prompt.vision_prompt(images.len())).with_images(images);
                (&self.vision_model, request)
            }
            StrategyId::OcrThenLlm => {
                let engine = self
                    .ocr
                    .as_ref()
                    .ok_or_else(|| ExtractionError::ModelUnavailable("no OCR engine configured".to_string()))?;
                let ocr_pages = recognize_pages(
                    Arc::clone(engine),
                    &document.pages,
                    self.config.ocr_concurrency,
                    self.config.ocr_timeout(),
                )
                .await?;
                let texts = merge_page_text(&document.pages, &ocr_pages);
                (&self.text_model, self.text_request(&prompt, &texts))
            }
        };

        debug!(model = model.name(), prompt_chars = request.prompt.len(), "Calling extraction model");

        let response = timeout(self.config.call_timeout(), model.generate(&request))
            .await
            .map_err(|_| ExtractionError::Timeout(self.config.call_timeout_ms))??;

        debug!(response_chars = response.len(), "Extraction model answered");

        let candidates = parse_extraction_response(&response, fields, document.pages.len().max(1))?;
        info!(
            found = candidates.iter().filter(|c| c.is_present()).count(),
            fields = fields.len(),
            "Extraction complete"
        );
        Ok(candidates)
    }

    fn text_request(&self, prompt: &PromptBuilder<'_>, texts: &[String]) -> ModelRequest {
        ModelRequest::text(prompt.system(), prompt.text_prompt(texts, self.config.max_document_chars))
    }
}
