//! Normalized document representation

use docex_domain::ClassificationMetadata;
use std::sync::Arc;

/// Raster (or whole-document) content for one page
///
/// For PDFs without an embedded page image the data is the whole PDF; OCR
/// services select the page by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// MIME type of `data`
    pub media_type: String,
    /// Shared bytes
    pub data: Arc<Vec<u8>>,
}

impl PageImage {
    /// Wrap bytes of the given media type
    pub fn new(media_type: impl Into<String>, data: Arc<Vec<u8>>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }

    /// Whether the data is a raster image (as opposed to a whole document)
    pub fn is_raster(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// One page (PDF), section (DOCX) or image
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Zero-based position
    pub index: usize,
    /// Extractable text; empty for images and image-only pages
    pub text: String,
    /// Image reference, when the page has raster content
    pub image: Option<PageImage>,
}

/// Output of normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    /// Pages in document order
    pub pages: Vec<Page>,
    /// Classification signals
    pub classification: ClassificationMetadata,
}

impl NormalizedDocument {
    /// Total non-whitespace characters across all pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| count_text_chars(&p.text)).sum()
    }
}

/// Count non-whitespace characters
pub fn count_text_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
