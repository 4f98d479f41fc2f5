//! Docex Orchestrator
//!
//! Threads one extraction request through the pipeline and assembles the
//! final, phase-tagged result.
//!
//! # Phases
//!
//! ```text
//! Intake → Classifying → Routing → Extracting → Validating → Assembling
//!                                      ↺ (one retry on model_unavailable/timeout)
//! ```
//!
//! Every failure ends the request in `Failed` with the phase that raised
//! it and whatever was computed before. A required field below its
//! threshold still completes, with `success: false`.
//!
//! # Example Usage
//!
//! ```no_run
//! use docex_orchestrator::{Collaborators, ExtractDocumentInput, Orchestrator, Settings};
//!
//! # async fn example(input: ExtractDocumentInput) -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(None)?;
//! let collaborators = Collaborators::from_settings(&settings)?;
//! let orchestrator = Orchestrator::new(&settings, &collaborators);
//!
//! let result = orchestrator.run(input.into_request()).await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! collaborators.shutdown();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod collaborators;
mod error;
mod failure;
mod orchestrator;
mod settings;
mod wire;

pub use collaborators::Collaborators;
pub use error::{ConfigError, IntakeError};
pub use failure::{below_threshold, PhaseFailure};
pub use orchestrator::{Orchestrator, RunReport, MAX_EXTRACTION_RETRIES};
pub use settings::{ModelProvider, ModelsConfig, OcrConfig, PipelineConfig, ServerConfig, Settings};
pub use wire::ExtractDocumentInput;
