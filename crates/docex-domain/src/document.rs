//! Request-side types: file types, field specifications and the request itself

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported document types
///
/// Parsing is case-insensitive and tolerant of surrounding whitespace;
/// `jpeg` is accepted as an alias for `jpg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Portable Document Format (digital or scanned)
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// PNG image
    Png,
    /// JPEG image
    Jpg,
}

impl FileType {
    /// Every supported type, in display order
    pub const ALL: [FileType; 4] = [FileType::Pdf, FileType::Docx, FileType::Png, FileType::Jpg];

    /// Get the canonical type name
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
            FileType::Png => "png",
            FileType::Jpg => "jpg",
        }
    }

    /// Parse a declared file type
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "docx" => Some(FileType::Docx),
            "png" => Some(FileType::Png),
            "jpg" | "jpeg" => Some(FileType::Jpg),
            _ => None,
        }
    }

    /// Whether this type is a single raster image
    pub fn is_image(&self) -> bool {
        matches!(self, FileType::Png | FileType::Jpg)
    }

    /// MIME type used when the document is handed to a collaborator
    pub fn media_type(&self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileType::Png => "image/png",
            FileType::Jpg => "image/jpeg",
        }
    }

    /// Comma-separated list of supported type names
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type hint for a field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFormat {
    /// Free text
    String,
    /// Decimal number (amounts, measurements)
    Number,
    /// Whole number
    Integer,
    /// Calendar date
    Date,
    /// Yes/no flag
    Boolean,
    /// Any other hint, passed through to the model verbatim
    Other(String),
}

impl FieldFormat {
    /// Parse a format hint; unknown hints are kept as [`FieldFormat::Other`]
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" | "string" | "text" | "str" => FieldFormat::String,
            "number" | "float" | "decimal" | "currency" | "amount" => FieldFormat::Number,
            "integer" | "int" => FieldFormat::Integer,
            "date" => FieldFormat::Date,
            "boolean" | "bool" => FieldFormat::Boolean,
            _ => FieldFormat::Other(normalized),
        }
    }
}

fn default_format() -> String {
    "string".to_string()
}

/// A caller-specified field to extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique key for the field within a request
    pub name: String,

    /// Guidance text describing what to look for
    #[serde(default)]
    pub description: String,

    /// Semantic type hint (string, number, date, ...)
    #[serde(default = "default_format")]
    pub format: String,

    /// Whether absence or low confidence fails the request
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Create an optional string field
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            format: default_format(),
            required: false,
        }
    }

    /// Set the format hint
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Parsed format hint
    pub fn field_format(&self) -> FieldFormat {
        FieldFormat::parse(&self.format)
    }
}

/// Raw document payload as received from a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    /// Base64 text as carried by the tool call and event interfaces
    Base64(String),
    /// Already-decoded bytes (CLI, tests)
    Bytes(Vec<u8>),
}

impl DocumentPayload {
    /// Whether the payload carries no content at all
    pub fn is_empty(&self) -> bool {
        match self {
            DocumentPayload::Base64(s) => s.trim().is_empty(),
            DocumentPayload::Bytes(b) => b.is_empty(),
        }
    }

    /// Size of the payload as received, in bytes
    pub fn transport_len(&self) -> usize {
        match self {
            DocumentPayload::Base64(s) => s.len(),
            DocumentPayload::Bytes(b) => b.len(),
        }
    }
}

/// A request to extract fields from one document
///
/// Immutable once accepted by intake.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    /// The document payload
    pub payload: DocumentPayload,

    /// Declared file type, as supplied by the caller
    pub file_type: String,

    /// Ordered field specifications
    pub fields: Vec<FieldSpec>,
}

impl ExtractionRequest {
    /// Create a new request
    pub fn new(payload: DocumentPayload, file_type: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            payload,
            file_type: file_type.into(),
            fields,
        }
    }

    /// Look up a field specification by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
