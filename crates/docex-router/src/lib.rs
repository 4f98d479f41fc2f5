//! Docex Strategy Router
//!
//! Deterministically picks an extraction strategy from classification
//! signals. Rules are evaluated in order and the first match wins:
//!
//! 1. Scanned document: `ocr_then_llm` (fails if OCR is unavailable; there is
//!    no fallback to a vision model)
//! 2. PNG/JPG: `vision_llm`
//! 3. Otherwise: `text_llm`
//!
//! The decision is computed once per request and never re-evaluated.

#![warn(missing_docs)]

pub mod error;
pub mod policy;

pub use error::RoutingError;
pub use policy::{RoutingRule, StrategyRouter};
