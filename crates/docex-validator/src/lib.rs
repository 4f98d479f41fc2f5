//! Docex Validator
//!
//! Assigns every extracted field a confidence score and applies the
//! threshold gate.
//!
//! Each present candidate gets its own verification call against the
//! validation model, never the extraction model. Absent candidates score 0
//! with `no_evidence` and cost nothing.
//!
//! Gate rules:
//! - A required field passes when its score reaches the threshold
//! - An optional field always passes
//! - A required field with no evidence at all fails the phase
//!
//! # Examples
//!
//! ```no_run
//! use docex_validator::{ConfidenceValidator, ValidationConfig};
//! use docex_llm::MockLanguageModel;
//! use std::sync::Arc;
//!
//! let model = Arc::new(MockLanguageModel::new(r#"{"score": 0.9}"#));
//! let validator = ConfidenceValidator::new(model, ValidationConfig::default());
//! // let confidences = validator.validate(&candidates, &fields, &pages).await?;
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod prompt;
mod validator;
mod verdict;

pub use config::ValidationConfig;
pub use error::{ValidationFailure, ValidationPhaseError};
pub use prompt::{VerificationPrompt, VERIFICATION_INSTRUCTIONS};
pub use validator::{overall_confidence, ConfidenceValidator};
pub use verdict::{parse_verdict, Verdict};
