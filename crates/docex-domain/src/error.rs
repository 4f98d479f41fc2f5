//! Error type shared by collaborator clients

use thiserror::Error;

/// Failure reported by an external collaborator (model or OCR service)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Service unreachable or refused the request
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its per-call timeout
    #[error("Call timed out after {0}ms")]
    Timeout(u64),

    /// Service answered with something that could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Service asked us to back off
    #[error("Rate limited")]
    RateLimited,

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl CollaboratorError {
    /// Whether the failure means the service could not be reached or used
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Unavailable(_) | CollaboratorError::RateLimited
        )
    }
}
