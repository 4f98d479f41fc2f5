//! Classification signals computed once per request by the normalizer

use crate::FileType;
use serde::{Deserialize, Serialize};

/// Coarse assessment of raster image quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    /// Enough resolution and contrast for reliable reading
    Good,
    /// Low resolution or washed-out contrast
    Poor,
    /// No raster content was assessed
    Unknown,
}

impl ImageQuality {
    /// Get the quality name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Good => "good",
            ImageQuality::Poor => "poor",
            ImageQuality::Unknown => "unknown",
        }
    }
}

/// Document classification signals
///
/// Produced once per request and reused unchanged if extraction is retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationMetadata {
    /// Normalized file type
    pub file_type: FileType,

    /// Whether the document appears to be a scan without a usable text layer
    pub is_scanned: bool,

    /// Extractable characters per letter-page equivalent
    pub text_density: f64,

    /// Raster quality estimate
    pub image_quality: ImageQuality,

    /// Number of pages (sections for DOCX, 1 for images)
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let meta = ClassificationMetadata {
            file_type: FileType::Pdf,
            is_scanned: true,
            text_density: 12.5,
            image_quality: ImageQuality::Unknown,
            page_count: 2,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["fileType"], "pdf");
        assert_eq!(json["isScanned"], true);
        assert_eq!(json["imageQuality"], "unknown");
        assert_eq!(json["pageCount"], 2);
    }
}
