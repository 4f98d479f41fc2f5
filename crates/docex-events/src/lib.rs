//! Docex Events
//!
//! Asynchronous interface to the extraction pipeline.
//!
//! - `document.extraction.requested` carries the tool-call input
//! - `document.extraction.completed` carries the tool-call output
//! - `document.extraction.failed` carries the phase, message and a
//!   remediation hint
//!
//! The [`EventWorker`] turns requests into replies over tokio channels and
//! keeps [`EventMetrics`].

#![warn(missing_docs)]

mod envelope;
mod error;
mod metrics;
mod worker;

pub use envelope::{DocumentEvent, FailureNotice, COMPLETED, FAILED, REQUESTED};
pub use error::{EventError, Result};
pub use metrics::EventMetrics;
pub use worker::EventWorker;
