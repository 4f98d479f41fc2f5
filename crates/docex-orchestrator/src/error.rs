//! Error types for the Orchestrator

use thiserror::Error;

/// Request rejected before any collaborator is invoked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// No document payload
    #[error("Request has no document payload")]
    MissingPayload,

    /// No fields requested
    #[error("Request has no data elements")]
    EmptyFieldSet,

    /// A field without a name
    #[error("Data element {0} has an empty name")]
    EmptyFieldName(usize),

    /// Two fields share a name
    #[error("Data element name '{0}' is used more than once")]
    DuplicateFieldName(String),
}

impl IntakeError {
    /// Stable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            IntakeError::MissingPayload => "missing_payload",
            IntakeError::EmptyFieldSet => "empty_field_set",
            IntakeError::EmptyFieldName(_) => "empty_field_name",
            IntakeError::DuplicateFieldName(_) => "duplicate_field_name",
        }
    }
}

/// Settings could not be loaded or are invalid
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to render TOML
    #[error("Failed to serialize config: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// An environment override has an unusable value
    #[error("Invalid value '{value}' for {var}")]
    InvalidOverride {
        /// Environment variable name
        var: String,
        /// Offending value
        value: String,
    },

    /// A setting is out of range
    #[error("Invalid configuration [{section}]: {message}")]
    Invalid {
        /// TOML section holding the bad key
        section: &'static str,
        /// What is wrong
        message: String,
    },

    /// The HTTP client for collaborators could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
