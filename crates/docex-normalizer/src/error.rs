//! Error types for payload decoding and normalization

use thiserror::Error;

/// Errors raised while decoding a document payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Payload could not be decoded as the declared type
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Payload exceeds the configured byte limit
    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    Oversize {
        /// Observed (or estimated) decoded size
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Declared file type is not supported
    #[error("Unsupported file type '{0}'")]
    UnsupportedType(String),
}

impl PayloadError {
    /// Stable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            PayloadError::Malformed(_) => "malformed",
            PayloadError::Oversize { .. } => "oversize",
            PayloadError::UnsupportedType(_) => "unsupported_type",
        }
    }
}

/// Result type for normalizer operations
pub type Result<T> = std::result::Result<T, PayloadError>;
