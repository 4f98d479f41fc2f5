//! PDF normalization via lopdf
//!
//! Pages keep their own text. Density is measured per letter-page equivalent
//! (612 x 792 pt), using each page's MediaBox as the area proxy.

use crate::config::NormalizerConfig;
use crate::error::{PayloadError, Result};
use crate::raster;
use crate::types::{count_text_chars, NormalizedDocument, Page, PageImage};
use docex_domain::{ClassificationMetadata, FileType, ImageQuality};
use lopdf::{Document, Object, ObjectId};
use std::sync::Arc;

/// Area of a US-Letter page in square points
pub const LETTER_AREA: f64 = 612.0 * 792.0;

/// Normalize a PDF
pub fn normalize_pdf(bytes: Vec<u8>, config: &NormalizerConfig) -> Result<NormalizedDocument> {
    let doc = Document::load_mem(&bytes)
        .map_err(|e| PayloadError::Malformed(format!("PDF could not be parsed: {}", e)))?;

    let page_ids = doc.get_pages();
    if page_ids.is_empty() {
        return Err(PayloadError::Malformed("PDF document has no pages".to_string()));
    }

    let whole = Arc::new(bytes);
    let mut pages = Vec::with_capacity(page_ids.len());
    let mut total_chars = 0usize;
    let mut total_letter_pages = 0.0f64;
    let mut quality = ImageQuality::Unknown;

    for (index, (number, page_id)) in page_ids.into_iter().enumerate() {
        let text = match doc.extract_text(&[number]) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::debug!(page = number, "No text layer on page: {}", e);
                String::new()
            }
        };
        total_chars += count_text_chars(&text);
        total_letter_pages += (media_box_area(&doc, page_id) / LETTER_AREA).max(f64::EPSILON);

        let image = match embedded_jpeg(&doc, page_id) {
            Some(jpeg) => {
                if quality == ImageQuality::Unknown {
                    quality = raster::assess_quality(&jpeg, FileType::Jpg, config)
                        .unwrap_or(ImageQuality::Unknown);
                }
                PageImage::new("image/jpeg", Arc::new(jpeg))
            }
            None => PageImage::new(FileType::Pdf.media_type(), Arc::clone(&whole)),
        };

        pages.push(Page {
            index,
            text,
            image: Some(image),
        });
    }

    let text_density = total_chars as f64 / total_letter_pages;
    let is_scanned = text_density < config.text_density_threshold;
    tracing::debug!(pages = pages.len(), total_chars, text_density, is_scanned, "Classified PDF");

    Ok(NormalizedDocument {
        classification: ClassificationMetadata {
            file_type: FileType::Pdf,
            is_scanned,
            text_density,
            image_quality: quality,
            page_count: pages.len(),
        },
        pages,
    })
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// MediaBox area, following inherited boxes up the page tree
fn media_box_area(doc: &Document, page_id: ObjectId) -> f64 {
    let mut current = doc.get_dictionary(page_id).ok();
    for _ in 0..32 {
        let Some(dict) = current else { break };

        let media_box = dict
            .get(b"MediaBox")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok());
        if let Some(values) = media_box {
            let coords: Vec<f64> = values.iter().filter_map(number).collect();
            if coords.len() == 4 {
                let area = ((coords[2] - coords[0]) * (coords[3] - coords[1])).abs();
                if area > 0.0 {
                    return area;
                }
            }
        }

        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    LETTER_AREA
}

/// Largest DCT-encoded image XObject on the page, as raw JPEG bytes
fn embedded_jpeg(doc: &Document, page_id: ObjectId) -> Option<Vec<u8>> {
    let page = doc.get_dictionary(page_id).ok()?;
    let resources = resolve(doc, page.get(b"Resources").ok()?)?.as_dict().ok()?;
    let xobjects = resolve(doc, resources.get(b"XObject").ok()?)?.as_dict().ok()?;

    xobjects
        .iter()
        .filter_map(|(_, obj)| match resolve(doc, obj)? {
            Object::Stream(stream) => Some(stream),
            _ => None,
        })
        .filter(|stream| is_name(stream.dict.get(b"Subtype").ok(), b"Image"))
        .filter(|stream| {
            stream.dict.get(b"Filter").ok().is_some_and(|filter| match filter {
                Object::Array(filters) => filters.iter().any(|f| is_name(Some(f), b"DCTDecode")),
                single => is_name(Some(single), b"DCTDecode"),
            })
        })
        .max_by_key(|stream| stream.content.len())
        .map(|stream| stream.content.clone())
}

fn is_name(obj: Option<&Object>, expected: &[u8]) -> bool {
    matches!(obj, Some(Object::Name(name)) if name.as_slice() == expected)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Build a PDF with one page per entry, each showing that text
    pub(crate) fn make_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for text in page_texts {
            let mut ops = String::from("BT /F1 10 Tf 50 740 Td 12 TL ");
            for line in text.lines() {
                ops.push_str(&format!("({}) Tj T* ", line));
            }
            ops.push_str("ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// A paragraph long enough to clear the default density threshold
    pub(crate) fn dense_text(marker: &str) -> String {
        let mut lines = vec![marker.to_string()];
        for i in 0..12 {
            lines.push(format!("Line {} of the remittance terms and conditions apply here", i));
        }
        lines.join("\n")
    }

    #[test]
    fn test_digital_pdf_is_not_scanned() {
        let text = dense_text("Invoice Number INV-2024-001");
        let bytes = make_pdf(&[&text]);
        let doc = normalize_pdf(bytes, &NormalizerConfig::default()).unwrap();

        assert_eq!(doc.classification.page_count, 1);
        assert!(!doc.classification.is_scanned);
        assert!(doc.classification.text_density >= 100.0);
        assert!(doc.pages[0].text.contains("INV-2024-001"));
    }

    #[test]
    fn test_empty_pages_are_scanned() {
        let bytes = make_pdf(&["", ""]);
        let doc = normalize_pdf(bytes, &NormalizerConfig::default()).unwrap();

        assert_eq!(doc.classification.page_count, 2);
        assert!(doc.classification.is_scanned);
        assert_eq!(doc.pages[1].index, 1);
        let image = doc.pages[1].image.as_ref().unwrap();
        assert_eq!(image.media_type, "application/pdf");
        assert!(!image.is_raster());
    }

    #[test]
    fn test_sparse_text_is_scanned_despite_nonzero_density() {
        let bytes = make_pdf(&["Page 1"]);
        let doc = normalize_pdf(bytes, &NormalizerConfig::default()).unwrap();
        assert!(doc.classification.text_density > 0.0);
        assert!(doc.classification.is_scanned);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = normalize_pdf(b"%PDF-1.4 but not really".to_vec(), &NormalizerConfig::default()).unwrap_err();
        assert_eq!(err.reason(), "malformed");
    }
}
