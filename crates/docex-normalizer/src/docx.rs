//! DOCX normalization via zip + quick-xml
//!
//! Sections are delimited by explicit page breaks. Table rows are emitted as
//! `cell | cell` lines. A section counts as one letter page for density.
//! Parts are inflated against a shared budget of `max_payload_bytes`.

use crate::config::NormalizerConfig;
use crate::error::{PayloadError, Result};
use crate::raster;
use crate::types::{count_text_chars, NormalizedDocument, Page, PageImage};
use docex_domain::{ClassificationMetadata, FileType, ImageQuality};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const MEDIA_PREFIX: &str = "word/media/";

/// Normalize a DOCX package
pub fn normalize_docx(bytes: &[u8], config: &NormalizerConfig) -> Result<NormalizedDocument> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PayloadError::Malformed(format!("DOCX container could not be opened: {}", e)))?;

    let mut budget = InflateBudget::new(config.max_payload_bytes);

    let xml = {
        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| PayloadError::Malformed(format!("DOCX package has no {}", DOCUMENT_PART)))?;
        let body = budget
            .read(part)
            .map_err(|e| e.or_malformed(|io| format!("DOCX body could not be read: {}", io)))?;
        String::from_utf8(body).map_err(|_| PayloadError::Malformed("DOCX body is not UTF-8".to_string()))?
    };

    let sections = extract_sections(&xml)?;
    let media = read_media(&mut archive, &mut budget)?;

    let total_chars: usize = sections.iter().map(|s| count_text_chars(s)).sum();
    let text_density = total_chars as f64 / sections.len().max(1) as f64;
    let is_scanned = text_density < config.text_density_threshold && !media.is_empty();

    let quality = media
        .first()
        .and_then(|img| {
            let file_type = if img.media_type == "image/png" { FileType::Png } else { FileType::Jpg };
            raster::assess_quality(&img.data, file_type, config).ok()
        })
        .unwrap_or(ImageQuality::Unknown);

    // Image-only documents are read one embedded image per page. Media order
    // says nothing about which page-break section an image sits in, so image
    // pages carry no body text.
    let pages: Vec<Page> = if is_scanned {
        media
            .into_iter()
            .enumerate()
            .map(|(index, image)| Page {
                index,
                text: String::new(),
                image: Some(image),
            })
            .collect()
    } else {
        sections
            .into_iter()
            .enumerate()
            .map(|(index, text)| Page { index, text, image: None })
            .collect()
    };

    tracing::debug!(pages = pages.len(), total_chars, text_density, is_scanned, "Classified DOCX");

    Ok(NormalizedDocument {
        classification: ClassificationMetadata {
            file_type: FileType::Docx,
            is_scanned,
            text_density,
            image_quality: quality,
            page_count: pages.len(),
        },
        pages,
    })
}

/// Walk the document body, splitting on hard page breaks
fn extract_sections(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut sections = vec![String::new()];
    let mut in_text = false;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PayloadError::Malformed(format!("DOCX body is not valid XML: {}", e)))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:tr" => row = Some(Vec::new()),
                b"w:tc" => cell = Some(String::new()),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:br" if is_page_break(&e) => {
                    finish_line(&mut sections);
                    sections.push(String::new());
                }
                b"w:tab" => push_text(&mut sections, &mut cell, "\t"),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| PayloadError::Malformed(format!("DOCX text could not be decoded: {}", e)))?;
                push_text(&mut sections, &mut cell, &text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => match cell.as_mut() {
                    Some(c) => c.push(' '),
                    None => finish_line(&mut sections),
                },
                b"w:tc" => {
                    if let (Some(r), Some(c)) = (row.as_mut(), cell.take()) {
                        let c = c.trim().to_string();
                        if !c.is_empty() {
                            r.push(c);
                        }
                    }
                }
                b"w:tr" => {
                    if let Some(r) = row.take() {
                        if !r.is_empty() {
                            push_text(&mut sections, &mut None, &r.join(" | "));
                            finish_line(&mut sections);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sections.into_iter().map(|s| s.trim().to_string()).collect())
}

fn is_page_break(e: &BytesStart<'_>) -> bool {
    matches!(
        e.try_get_attribute("w:type"),
        Ok(Some(attr)) if attr.value.as_ref() == b"page"
    )
}

fn push_text(sections: &mut [String], cell: &mut Option<String>, text: &str) {
    match cell.as_mut() {
        Some(c) => c.push_str(text),
        None => {
            if let Some(current) = sections.last_mut() {
                current.push_str(text);
            }
        }
    }
}

fn finish_line(sections: &mut [String]) {
    if let Some(current) = sections.last_mut() {
        if !current.is_empty() && !current.ends_with('\n') {
            current.push('\n');
        }
    }
}

/// Inflated bytes remaining across all parts of one package
struct InflateBudget {
    limit: usize,
    used: usize,
}

enum PartReadError {
    Payload(PayloadError),
    Io(std::io::Error),
}

impl PartReadError {
    fn or_malformed(self, describe: impl FnOnce(std::io::Error) -> String) -> PayloadError {
        match self {
            PartReadError::Payload(e) => e,
            PartReadError::Io(io) => PayloadError::Malformed(describe(io)),
        }
    }
}

impl InflateBudget {
    fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Inflate one part, failing as oversize once the package total passes the limit
    fn read(&mut self, part: impl Read) -> std::result::Result<Vec<u8>, PartReadError> {
        let remaining = self.limit.saturating_sub(self.used);
        let mut data = Vec::new();
        part.take(remaining as u64 + 1)
            .read_to_end(&mut data)
            .map_err(PartReadError::Io)?;
        self.used += data.len();
        if data.len() > remaining {
            return Err(PartReadError::Payload(PayloadError::Oversize {
                size: self.used,
                limit: self.limit,
            }));
        }
        Ok(data)
    }
}

/// Embedded raster images, in package order
fn read_media(archive: &mut ZipArchive<Cursor<&[u8]>>, budget: &mut InflateBudget) -> Result<Vec<PageImage>> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with(MEDIA_PREFIX))
        .map(str::to_string)
        .collect();
    names.sort();

    let mut images = Vec::new();
    for name in names {
        let lower = name.to_lowercase();
        let media_type = if lower.ends_with(".png") {
            "image/png"
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            "image/jpeg"
        } else {
            continue;
        };

        let file = match archive.by_name(&name) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(part = %name, "Skipping missing media part: {}", e);
                continue;
            }
        };
        let data = match budget.read(file) {
            Ok(data) => data,
            Err(PartReadError::Payload(e)) => return Err(e),
            Err(PartReadError::Io(e)) => {
                tracing::warn!(part = %name, "Skipping unreadable media part: {}", e);
                continue;
            }
        };
        images.push(PageImage::new(media_type, Arc::new(data)));
    }
    Ok(images)
}
