//! Event envelopes
//!
//! One JSON object per event, tagged by `type`:
//!
//! ```json
//! {"type": "document.extraction.requested", "requestId": "...", "payload": {...}}
//! ```

use crate::error::Result;
use docex_domain::{DocumentType, ExtractionResult, Phase, StrategyDecision};
use docex_orchestrator::{ExtractDocumentInput, RunReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event name for extraction requests
pub const REQUESTED: &str = "document.extraction.requested";
/// Event name for completed extractions
pub const COMPLETED: &str = "document.extraction.completed";
/// Event name for failed extractions
pub const FAILED: &str = "document.extraction.failed";

/// Payload of `document.extraction.failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureNotice {
    /// Phase that raised the failure
    pub phase: Phase,
    /// Stable reason code
    pub reason: String,
    /// Human-readable description
    pub message: String,
    /// What the requester can do about it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Classification, when it completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    /// Routing decision, when it completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_strategy: Option<StrategyDecision>,
}

/// A document extraction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocumentEvent {
    /// Ask for one extraction
    #[serde(rename = "document.extraction.requested")]
    Requested {
        /// Correlation id, generated when the requester leaves it out
        #[serde(rename = "requestId", default = "Uuid::now_v7")]
        request_id: Uuid,
        /// Same shape as the tool-call input
        payload: ExtractDocumentInput,
    },

    /// The pipeline completed (`success` may still be false)
    #[serde(rename = "document.extraction.completed")]
    Completed {
        /// Correlation id of the request
        #[serde(rename = "requestId")]
        request_id: Uuid,
        /// Same shape as the tool-call output
        payload: ExtractionResult,
    },

    /// The pipeline stopped in a failed phase
    #[serde(rename = "document.extraction.failed")]
    Failed {
        /// Correlation id of the request
        #[serde(rename = "requestId")]
        request_id: Uuid,
        /// Phase, message and remediation hint
        payload: FailureNotice,
    },
}

impl DocumentEvent {
    /// New request with a fresh id
    pub fn requested(payload: ExtractDocumentInput) -> Self {
        DocumentEvent::Requested {
            request_id: Uuid::now_v7(),
            payload,
        }
    }

    /// Reply event for a finished request
    pub fn from_report(request_id: Uuid, report: RunReport) -> Self {
        match report.failure {
            Some(failure) => DocumentEvent::Failed {
                request_id,
                payload: FailureNotice {
                    phase: failure.phase,
                    reason: failure.reason.to_string(),
                    message: failure.message,
                    remediation: Some(failure.remediation),
                    document_type: report.result.document_type,
                    extraction_strategy: report.result.extraction_strategy,
                },
            },
            None => DocumentEvent::Completed {
                request_id,
                payload: report.result,
            },
        }
    }

    /// Event name
    pub fn event_type(&self) -> &'static str {
        match self {
            DocumentEvent::Requested { .. } => REQUESTED,
            DocumentEvent::Completed { .. } => COMPLETED,
            DocumentEvent::Failed { .. } => FAILED,
        }
    }

    /// Correlation id
    pub fn request_id(&self) -> Uuid {
        match self {
            DocumentEvent::Requested { request_id, .. }
            | DocumentEvent::Completed { request_id, .. }
            | DocumentEvent::Failed { request_id, .. } => *request_id,
        }
    }

    /// Decode one JSON line
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Encode as one JSON line (no trailing newline)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
