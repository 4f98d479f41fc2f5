//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use docex_domain::ExtractionResult;
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (values only) format
    Quiet,
}

impl From<crate::cli::CliFormat> for OutputFormat {
    fn from(format: crate::cli::CliFormat) -> Self {
        match format {
            crate::cli::CliFormat::Table => OutputFormat::Table,
            crate::cli::CliFormat::Json => OutputFormat::Json,
            crate::cli::CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an extraction result.
    pub fn format_result(&self, result: &ExtractionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => Ok(self.format_result_table(result)),
            OutputFormat::Quiet => Ok(serde_json::to_string(&result.extracted_data)?),
        }
    }

    /// Format a result as a summary line, a field table and any errors.
    fn format_result_table(&self, result: &ExtractionResult) -> String {
        let mut out = Vec::new();

        let document = result
            .document_type
            .as_ref()
            .map(|d| {
                format!(
                    "{}{} (density {:.2})",
                    d.file_type,
                    if d.is_scanned { ", scanned" } else { "" },
                    d.text_density
                )
            })
            .unwrap_or_else(|| "unclassified".to_string());
        let strategy = result
            .extraction_strategy
            .as_ref()
            .map(|s| s.strategy_id.to_string())
            .unwrap_or_else(|| "none".to_string());
        out.push(self.info(&format!("Document: {}  Strategy: {}", document, strategy)));

        if !result.confidence_per_field.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value", "Confidence", "Reason", "Page", "Passed"]);

            for (name, confidence) in &result.confidence_per_field {
                let value = result
                    .extracted_data
                    .get(name)
                    .map(display_value)
                    .unwrap_or_else(|| "-".to_string());
                let page = result
                    .provenance
                    .get(name)
                    .map(|e| e.page_index.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let score = format!("{:.2}", confidence.score);
                let passed = if confidence.passed { "yes" } else { "no" };
                builder.push_record([
                    name.as_str(),
                    &value,
                    &score,
                    confidence.reason_code.as_str(),
                    &page,
                    passed,
                ]);
            }

            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            out.push(table.to_string());
        }

        if let Some(overall) = result.overall_confidence {
            out.push(format!("Overall confidence: {:.2}", overall));
        }

        for error in result.errors.iter().flatten() {
            let line = format!("[{}] {}: {}", error.phase, error.reason, error.message);
            out.push(if error.phase == docex_domain::Phase::Validating {
                self.warning(&line)
            } else {
                self.error(&line)
            });
            if let Some(remediation) = &error.remediation {
                out.push(format!("  {}", remediation));
            }
        }

        out.push(if result.success {
            self.success("Extraction succeeded")
        } else {
            self.error("Extraction did not succeed")
        });

        out.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Strings print bare, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docex_domain::{ErrorRecord, Evidence, FieldConfidence, Phase, ReasonCode};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn create_test_result() -> ExtractionResult {
        let mut extracted_data = BTreeMap::new();
        extracted_data.insert("total".to_string(), json!(1250.5));
        let mut confidence_per_field = BTreeMap::new();
        confidence_per_field.insert(
            "total".to_string(),
            FieldConfidence {
                field_name: "total".to_string(),
                score: 0.62,
                reason_code: ReasonCode::WeakMatch,
                passed: false,
            },
        );
        let mut provenance = BTreeMap::new();
        provenance.insert(
            "total".to_string(),
            Evidence {
                page_index: 1,
                location_hint: "totals box".to_string(),
                snippet_text: "Total: 1,250.50".to_string(),
            },
        );

        ExtractionResult {
            success: false,
            document_type: None,
            extraction_strategy: None,
            extracted_data,
            confidence_per_field,
            overall_confidence: Some(0.62),
            provenance,
            errors: Some(vec![ErrorRecord::new(
                Phase::Validating,
                "below_threshold",
                "total scored 0.62",
            )
            .with_remediation("Review the value manually")]),
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        assert!(output.contains("\"confidencePerField\""));
        assert!(output.contains("\"below_threshold\""));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        assert_eq!(output, r#"{"total":1250.5}"#);
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        assert!(output.contains("Confidence"));
        assert!(output.contains("weak_match"));
        assert!(output.contains("1250.5"));
        assert!(output.contains("[validating] below_threshold"));
        assert!(output.contains("Review the value manually"));
        assert!(output.contains("Document: unclassified"));
        assert!(output.ends_with("✗ Extraction did not succeed"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
