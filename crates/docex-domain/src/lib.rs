//! Docex Domain Layer
//!
//! This crate defines the value types shared by every stage of the extraction
//! pipeline and the narrow trait interfaces behind which the external
//! collaborators (language models, OCR) live.
//!
//! ## Key Concepts
//!
//! - **FieldSpec**: A caller-named field to pull out of a document
//! - **ClassificationMetadata**: Signals about the document (scanned, density, quality)
//! - **StrategyDecision**: The single, immutable choice of extraction method
//! - **FieldCandidate**: An extracted value plus the evidence that justifies it
//! - **FieldConfidence**: The validator's verdict on a candidate
//! - **ExtractionResult**: The deterministic response root
//!
//! ## Architecture
//!
//! Each stage owns the record it produces. Downstream stages read upstream
//! records but never mutate them; state accumulates by composition.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod classification;
pub mod document;
pub mod error;
pub mod result;
pub mod strategy;
pub mod traits;

// Re-exports for convenience
pub use candidate::{Evidence, FieldCandidate, FieldConfidence, ReasonCode};
pub use classification::{ClassificationMetadata, ImageQuality};
pub use document::{DocumentPayload, ExtractionRequest, FieldFormat, FieldSpec, FileType};
pub use error::CollaboratorError;
pub use result::{DocumentType, ErrorRecord, ExtractionResult, Phase};
pub use strategy::{StrategyDecision, StrategyId};
pub use traits::{ImageInput, LanguageModel, ModelRequest, OcrEngine, OcrInput, OcrLine, OcrPage};
