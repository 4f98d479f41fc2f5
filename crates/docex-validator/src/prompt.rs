//! Prompt construction for per-field verification calls

use docex_domain::{FieldCandidate, FieldSpec};
use docex_extractor::truncate_chars;

/// Default system instructions for verification calls
pub const VERIFICATION_INSTRUCTIONS: &str = r#"You are a meticulous reviewer checking values extracted from a business document.

For the single field below you are given the extracted value and the snippet cited as evidence.
Decide how well the evidence supports the value for the described field.

Scoring guidelines:
- 0.9-1.0: value is clearly present in the evidence and matches the description
- 0.7-0.9: value is present with minor formatting differences
- 0.5-0.7: value is partially supported or had to be inferred
- 0.0-0.5: value is not supported by the evidence

Reason codes:
- strong_match: the evidence clearly supports the value
- weak_match: the evidence supports the value only partially or ambiguously
- contradicted: the evidence points to a different value

Respond with a JSON object:
{"score": 0.0-1.0, "reasonCode": "strong_match" | "weak_match" | "contradicted"}"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY valid JSON. No explanation, no markdown fences.";

/// Builds one verification call
pub struct VerificationPrompt<'a> {
    field: &'a FieldSpec,
    candidate: &'a FieldCandidate,
    page_text: Option<&'a str>,
}

impl<'a> VerificationPrompt<'a> {
    /// Prompt for `candidate`, answering `field`
    pub fn new(field: &'a FieldSpec, candidate: &'a FieldCandidate) -> Self {
        Self {
            field,
            candidate,
            page_text: None,
        }
    }

    /// Attach the text of the cited page as context
    pub fn with_page_text(mut self, page_text: Option<&'a str>) -> Self {
        self.page_text = page_text.filter(|t| !t.trim().is_empty());
        self
    }

    /// System instructions
    pub fn system(&self, template: Option<&str>) -> String {
        format!(
            "{}\n\n{}",
            template.unwrap_or(VERIFICATION_INSTRUCTIONS),
            OUTPUT_FORMAT_REMINDER
        )
    }

    /// User prompt, with snippet and page context cut to the given budgets
    pub fn prompt(&self, max_snippet_chars: usize, max_context_chars: usize) -> String {
        let value = self
            .candidate
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "null".to_string());

        let mut prompt = format!(
            "Field: {}\nDescription: {}\nFormat: {}\nExtracted value: {}\n",
            self.field.name, self.field.description, self.field.format, value
        );

        if let Some(evidence) = &self.candidate.evidence {
            prompt.push_str(&format!(
                "Cited page: {}\nCited location: {}\nCited snippet:\n---\n{}\n---\n",
                evidence.page_index + 1,
                evidence.location_hint,
                truncate_chars(evidence.snippet_text.trim(), max_snippet_chars)
            ));
        }

        if let Some(text) = self.page_text {
            prompt.push_str(&format!(
                "\nPage text:\n---\n{}\n---\n",
                truncate_chars(text.trim(), max_context_chars)
            ));
        }

        prompt.push_str("\nScore the evidence for this field.");
        prompt
    }
}
