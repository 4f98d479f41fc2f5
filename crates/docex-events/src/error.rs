//! Error types for the event interface

use thiserror::Error;

/// Errors from decoding or exchanging events
#[derive(Error, Debug)]
pub enum EventError {
    /// A line is not a valid event envelope
    #[error("Invalid event: {0}")]
    Decode(#[from] serde_json::Error),

    /// The outbound channel was closed
    #[error("Event channel closed")]
    ChannelClosed,

    /// I/O on the event stream failed
    #[error("Event stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;
