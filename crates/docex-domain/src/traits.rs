//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the pipeline and the services it
//! consumes. Implementations live in `docex-llm`.

use crate::CollaboratorError;
use async_trait::async_trait;

/// An image handed to a vision-capable model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// MIME type (`image/png`, `image/jpeg`, `application/pdf`)
    pub media_type: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

/// One call to a language model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRequest {
    /// System instructions
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Images for image-grounded calls; empty for text-only calls
    pub images: Vec<ImageInput>,
}

impl ModelRequest {
    /// Text-only request
    pub fn text(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    /// Attach images
    pub fn with_images(mut self, images: Vec<ImageInput>) -> Self {
        self.images = images;
        self
    }
}

/// Language-model service (text and image-grounded)
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion and return the raw text answer
    async fn generate(&self, request: &ModelRequest) -> Result<String, CollaboratorError>;

    /// Model name for logs and rationale
    fn name(&self) -> &str;
}

/// Input for one OCR call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrInput {
    /// Zero-based page index
    pub page_index: usize,
    /// MIME type of `data`
    pub media_type: String,
    /// Page image, or the whole document when the service selects the page
    pub data: Vec<u8>,
}

/// A recognized line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrLine {
    /// Line text
    pub text: String,
    /// Coarse location ("top", "middle", "bottom", or a service-specific hint)
    pub location: String,
}

/// OCR output for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrPage {
    /// Zero-based page index
    pub page_index: usize,
    /// Full page text
    pub text: String,
    /// Line layout, when the service reports it
    pub lines: Vec<OcrLine>,
}

/// OCR / document-analysis service
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Whether the service can currently accept work
    async fn is_available(&self) -> bool;

    /// Recognize text on one page
    async fn recognize(&self, input: &OcrInput) -> Result<OcrPage, CollaboratorError>;
}
