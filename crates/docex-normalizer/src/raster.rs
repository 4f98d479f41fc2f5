//! PNG/JPG normalization and image quality heuristics

use crate::config::NormalizerConfig;
use crate::error::{PayloadError, Result};
use crate::types::{NormalizedDocument, Page, PageImage};
use docex_domain::{ClassificationMetadata, FileType, ImageQuality};
use image::{GenericImageView, ImageFormat};
use std::sync::Arc;

/// Upper bound on pixels sampled for the contrast estimate
const MAX_CONTRAST_SAMPLES: u64 = 250_000;

/// Normalize a single raster image into a one-page document
pub fn normalize_image(bytes: Vec<u8>, file_type: FileType, config: &NormalizerConfig) -> Result<NormalizedDocument> {
    let quality = assess_quality(&bytes, file_type, config)?;
    let image = PageImage::new(file_type.media_type(), Arc::new(bytes));

    Ok(NormalizedDocument {
        pages: vec![Page {
            index: 0,
            text: String::new(),
            image: Some(image),
        }],
        classification: ClassificationMetadata {
            file_type,
            is_scanned: false,
            text_density: 0.0,
            image_quality: quality,
            page_count: 1,
        },
    })
}

/// Rate an encoded image by resolution and grayscale contrast
pub fn assess_quality(bytes: &[u8], file_type: FileType, config: &NormalizerConfig) -> Result<ImageQuality> {
    let format = match file_type {
        FileType::Png => ImageFormat::Png,
        FileType::Jpg => ImageFormat::Jpeg,
        other => {
            return Err(PayloadError::Malformed(format!("{} is not a raster type", other)));
        }
    };

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PayloadError::Malformed(format!("image could not be decoded: {}", e)))?;

    let (width, height) = decoded.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels < config.low_resolution_pixels {
        tracing::debug!(width, height, "Low resolution image");
        return Ok(ImageQuality::Poor);
    }

    let contrast = grayscale_stddev(&decoded);
    if contrast < config.low_contrast_stddev {
        tracing::debug!(contrast, "Low contrast image");
        return Ok(ImageQuality::Poor);
    }
    Ok(ImageQuality::Good)
}

fn grayscale_stddev(img: &image::DynamicImage) -> f64 {
    let luma = img.to_luma8();
    let total = luma.len() as u64;
    if total == 0 {
        return 0.0;
    }
    let step = (total / MAX_CONTRAST_SAMPLES).max(1) as usize;

    let (mut sum, mut sum_sq, mut n) = (0.0f64, 0.0f64, 0.0f64);
    for value in luma.as_raw().iter().step_by(step) {
        let v = f64::from(*value);
        sum += v;
        sum_sq += v * v;
        n += 1.0;
    }
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0).sqrt()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Luma};
    use std::io::Cursor;

    /// Encode a grayscale test image; `pattern` maps (x, y) to a luma value
    pub(crate) fn encode_image(width: u32, height: u32, format: ImageOutputFormat, pattern: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| Luma([pattern(x, y)]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(buffer).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn checker(x: u32, y: u32) -> u8 {
        if (x / 8 + y / 8) % 2 == 0 {
            0
        } else {
            255
        }
    }

    #[test]
    fn test_large_contrasty_png_is_good() {
        let bytes = encode_image(1000, 600, ImageOutputFormat::Png, checker);
        let doc = normalize_image(bytes, FileType::Png, &NormalizerConfig::default()).unwrap();
        assert_eq!(doc.classification.image_quality, ImageQuality::Good);
        assert_eq!(doc.classification.text_density, 0.0);
        assert_eq!(doc.classification.page_count, 1);
        assert!(!doc.classification.is_scanned);
        assert_eq!(doc.pages[0].image.as_ref().unwrap().media_type, "image/png");
    }

    #[test]
    fn test_small_image_is_poor() {
        let bytes = encode_image(100, 100, ImageOutputFormat::Png, checker);
        let quality = assess_quality(&bytes, FileType::Png, &NormalizerConfig::default()).unwrap();
        assert_eq!(quality, ImageQuality::Poor);
    }

    #[test]
    fn test_flat_image_is_poor() {
        let bytes = encode_image(1000, 600, ImageOutputFormat::Png, |_, _| 128);
        let quality = assess_quality(&bytes, FileType::Png, &NormalizerConfig::default()).unwrap();
        assert_eq!(quality, ImageQuality::Poor);
    }

    #[test]
    fn test_jpeg_decodes() {
        let bytes = encode_image(800, 700, ImageOutputFormat::Jpeg(90), checker);
        let doc = normalize_image(bytes, FileType::Jpg, &NormalizerConfig::default()).unwrap();
        assert_eq!(doc.pages[0].image.as_ref().unwrap().media_type, "image/jpeg");
    }

    #[test]
    fn test_truncated_image_is_malformed() {
        let mut bytes = encode_image(64, 64, ImageOutputFormat::Png, checker);
        bytes.truncate(20);
        assert!(matches!(
            assess_quality(&bytes, FileType::Png, &NormalizerConfig::default()),
            Err(PayloadError::Malformed(_))
        ));
    }
}
