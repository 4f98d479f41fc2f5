//! Prompt construction for batched field extraction

use docex_domain::FieldSpec;

/// Builds the single batched extraction call for a request
pub struct PromptBuilder<'a> {
    fields: &'a [FieldSpec],
    template: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(fields: &'a [FieldSpec]) -> Self {
        Self { fields, template: None }
    }

    /// Use a custom system template containing `{elements}`
    pub fn with_template(mut self, template: Option<&'a str>) -> Self {
        self.template = template;
        self
    }

    /// Field list, one line per field
    pub fn elements(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                let mut line = format!("- {}: {} [format: {}]", f.name, f.description, f.format);
                if f.required {
                    line.push_str(" (REQUIRED)");
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// System instructions
    pub fn system(&self) -> String {
        let template = self.template.unwrap_or(EXTRACTION_INSTRUCTIONS);
        let mut system = template.replace("{elements}", &self.elements());
        system.push_str("\n\n");
        system.push_str(OUTPUT_FORMAT_REMINDER);
        system
    }

    /// User prompt over page texts (text and OCR strategies)
    pub fn text_prompt(&self, pages: &[String], max_chars: usize) -> String {
        let mut document = String::new();
        for (index, text) in pages.iter().enumerate() {
            if text.trim().is_empty() {
                continue;
            }
            document.push_str(&format!("=== Page {} ===\n{}\n\n", index + 1, text.trim()));
        }
        let full_chars = document.chars().count();
        let document = truncate_chars(&document, max_chars);
        if full_chars > max_chars {
            tracing::warn!(max_chars, full_chars, "Document text truncated for the extraction call");
        }

        format!(
            "Document text:\n---\n{}\n---\n\nExtract the requested data elements.",
            document.trim_end()
        )
    }

    /// User prompt for image-grounded calls
    pub fn vision_prompt(&self, image_count: usize) -> String {
        format!(
            "The document is attached as {} image(s). Image N is page N.\n\nExtract the requested data elements.",
            image_count
        )
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You extract specific data elements from business documents.

Data elements to extract:
{elements}

Rules:
- Only report a value you can point to in the document. Never guess or infer a value that is not written there.
- For every value, quote the exact supporting text as "snippet" and give the page number shown in the "=== Page N ===" marker (or the image number).
- "location" is a short hint such as "header", "top right", "line items table row 2", "signature block".
- If an element is not present, return null for it.
- If an element appears on several pages, return an array with one entry per occurrence.
- Dates as YYYY-MM-DD when the document date is unambiguous; numbers without currency symbols or thousands separators."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (a single JSON object, keyed by element name):
{
  "elementName": {"value": <value>, "page": 1, "location": "where on the page", "snippet": "exact text"},
  "missingElement": null
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
