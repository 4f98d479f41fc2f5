//! Docex Extractor
//!
//! Pulls caller-specified fields out of a normalized document with one
//! batched language-model call per request.
//!
//! # Architecture
//!
//! ```text
//! text_llm:      page text ─────────────────────┐
//! vision_llm:    page images ───────────────────┼→ model → parser → pooling → candidates
//! ocr_then_llm:  pages → OCR (fan-out/fan-in) ──┘
//! ```
//!
//! # Guarantees
//!
//! - Every present candidate carries a non-empty evidence snippet; anything
//!   else is reported absent
//! - Occurrences on several pages are pooled: the longer snippet wins, ties
//!   go to the earliest page
//! - OCR results are re-ordered by page index before pooling
//!
//! # Example Usage
//!
//! ```no_run
//! use docex_extractor::{ExtractorConfig, FieldExtractor};
//! use docex_domain::{FieldSpec, StrategyId};
//! use docex_llm::MockLanguageModel;
//! use docex_normalizer::Normalizer;
//! use std::sync::Arc;
//!
//! # async fn example(pdf: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let model = Arc::new(MockLanguageModel::new("{}"));
//! let extractor = FieldExtractor::new(model.clone(), model, None, ExtractorConfig::default());
//!
//! let document = Normalizer::default().normalize(&docex_domain::DocumentPayload::Bytes(pdf), "pdf")?;
//! let fields = vec![FieldSpec::new("invoiceNumber", "Invoice identifier").required()];
//! let candidates = extractor.extract(StrategyId::TextLlm, &document, &fields).await?;
//! println!("{} candidates", candidates.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod coerce;
mod config;
mod error;
mod extractor;
mod ocr;
mod parser;
mod pooling;
mod prompt;


pub use coerce::coerce_value;
pub use config::ExtractorConfig;
pub use error::ExtractionError;
pub use extractor::FieldExtractor;
pub use ocr::{merge_page_text, recognize_pages};
pub use parser::{parse_extraction_response, parse_json_object};
pub use pooling::pool_occurrences;
pub use prompt::{truncate_chars, PromptBuilder};
