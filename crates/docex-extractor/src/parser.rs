//! Parse model output into field candidates

use crate::coerce::coerce_value;
use crate::error::ExtractionError;
use crate::pooling::pool_occurrences;
use docex_domain::{Evidence, FieldCandidate, FieldSpec};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parse the batched extraction answer into one candidate per field
///
/// `page_count` bounds cited page numbers. Fields the model did not answer,
/// answered with null, or answered without evidence come back absent.
pub fn parse_extraction_response(
    response: &str,
    fields: &[FieldSpec],
    page_count: usize,
) -> Result<Vec<FieldCandidate>, ExtractionError> {
    let object = parse_json_object(response)?;

    // Some models nest everything under a single wrapper key
    let nested = match object.get("fields").or_else(|| object.get("data")) {
        Some(Value::Object(inner)) if !fields.iter().any(|f| object.contains_key(&f.name)) => Some(inner.clone()),
        _ => None,
    };
    let object = nested.unwrap_or(object);

    let candidates = fields
        .iter()
        .map(|field| {
            let entry = lookup(&object, &field.name);
            let occurrences = match entry {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| parse_occurrence(field, item, page_count))
                    .collect(),
                Some(item @ Value::Object(_)) => parse_occurrence(field, item, page_count)
                    .into_iter()
                    .collect(),
                Some(bare) => {
                    warn!(field = %field.name, "Value without evidence dropped: {}", bare);
                    Vec::new()
                }
            };
            pool_occurrences(&field.name, occurrences)
        })
        .collect::<Vec<_>>();

    debug!(
        present = candidates.iter().filter(|c| c.is_present()).count(),
        total = candidates.len(),
        "Parsed extraction response"
    );
    Ok(candidates)
}

/// Extract the JSON object from a response
///
/// Handles markdown fences, leading/trailing prose, and templates that leaked
/// doubled braces.
pub fn parse_json_object(response: &str) -> Result<Map<String, Value>, ExtractionError> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(&json_str)?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ExtractionError::MalformedModelOutput(format!(
            "Expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

fn extract_json(response: &str) -> Result<String, ExtractionError> {
    let trimmed = strip_fences(response.trim());

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    let mut segment = match (start, end) {
        (Some(s), Some(e)) if s < e => trimmed[s..=e].trim().to_string(),
        _ => {
            return Err(ExtractionError::MalformedModelOutput(
                "No JSON object found in response".to_string(),
            ))
        }
    };

    while segment.starts_with("{{") && segment.ends_with("}}") {
        segment = segment[1..segment.len() - 1].trim().to_string();
    }
    Ok(segment)
}

fn strip_fences(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }
    let body = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => return "",
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn lookup<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

fn string_of(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| item.get(*k))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
}

/// Zero-based page of an occurrence; `page` is 1-based, `pageIndex` 0-based
fn page_of(field: &str, item: &Map<String, Value>, page_count: usize) -> usize {
    let index = match (item.get("page"), item.get("pageIndex")) {
        (Some(page), _) if !page.is_null() => whole_number(page).map(|p| p.saturating_sub(1)),
        (_, Some(index)) if !index.is_null() => whole_number(index),
        _ => Some(0),
    };
    let index = index.unwrap_or_else(|| {
        let cited = item.get("page").or_else(|| item.get("pageIndex"));
        warn!(field = %field, ?cited, "Unreadable page reference, assuming first page");
        0
    });
    index.min(page_count.saturating_sub(1))
}

/// Non-negative integer from a number, a whole float, or a numeric string
fn whole_number(value: &Value) -> Option<usize> {
    let number = match value {
        Value::Number(n) => n.as_u64().map(|n| n as f64).or_else(|| n.as_f64())?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (number.is_finite() && number >= 0.0 && number.fract() == 0.0).then_some(number as usize)
}

fn parse_occurrence(field: &FieldSpec, item: &Value, page_count: usize) -> Option<FieldCandidate> {
    let Value::Object(item) = item else {
        warn!(field = %field.name, "Occurrence is not an object");
        return None;
    };

    let value = item.get("value").and_then(|v| coerce_value(v, &field.field_format()));
    let snippet = string_of(item, &["snippet", "snippetText", "evidence", "source"]).unwrap_or_default();
    let evidence = Evidence {
        page_index: page_of(&field.name, item, page_count),
        location_hint: string_of(item, &["location", "locationHint"]).unwrap_or_default(),
        snippet_text: snippet.trim().to_string(),
    };

    let candidate = FieldCandidate::new(field.name.clone(), value, Some(evidence));
    if !candidate.is_present() && item.get("value").is_some_and(|v| !v.is_null()) {
        warn!(field = %field.name, "Candidate without snippet dropped");
    }
    candidate.is_present().then_some(candidate)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("invoiceNumber", "Invoice id").required(),
            FieldSpec::new("total", "Amount due").with_format("number"),
            FieldSpec::new("dueDate", "Payment due").with_format("date"),
        ]
    }

    #[test]
    fn test_parse_valid_response() {
        let response = r#"{
            "invoiceNumber": {"value": "INV-001", "page": 1, "location": "header", "snippet": "Invoice # INV-001"},
            "total": {"value": "$1,200.00", "page": 2, "location": "totals", "snippet": "Total due: $1,200.00"},
            "dueDate": null
        }"#;
        let candidates = parse_extraction_response(response, &fields(), 2).unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].value, Some(json!("INV-001")));
        assert_eq!(candidates[0].evidence.as_ref().unwrap().location_hint, "header");
        assert_eq!(candidates[1].value, Some(json!(1200.0)));
        assert_eq!(candidates[1].evidence.as_ref().unwrap().page_index, 1);
        assert!(!candidates[2].is_present());
    }

    #[test]
    fn test_parse_with_markdown_wrapper() {
        let response = "```json\n{\"invoiceNumber\": {\"value\": \"A1\", \"page\": 1, \"snippet\": \"No. A1\"}}\n```";
        let candidates = parse_extraction_response(response, &fields(), 1).unwrap();
        assert!(candidates[0].is_present());
        assert!(!candidates[1].is_present());
    }

    #[test]
    fn test_parse_with_prose_and_double_braces() {
        let response = "Here you go:\n{{\"invoiceNumber\": {\"value\": \"A1\", \"snippet\": \"A1\"}}}\nThanks";
        let candidates = parse_extraction_response(response, &fields(), 1).unwrap();
        assert_eq!(candidates[0].value, Some(json!("A1")));
    }

    #[test]
    fn test_bare_value_without_evidence_is_absent() {
        let response = r#"{"invoiceNumber": "INV-001", "total": {"value": 10}}"#;
        let candidates = parse_extraction_response(response, &fields(), 1).unwrap();
        assert!(!candidates[0].is_present());
        assert!(!candidates[1].is_present());
        assert!(candidates[1].evidence.is_none());
    }

    #[test]
    fn test_occurrences_are_pooled() {
        let response = r#"{"total": [
            {"value": 10, "page": 1, "snippet": "Total 10"},
            {"value": 10, "page": 3, "snippet": "Grand total due: 10"}
        ]}"#;
        let candidates = parse_extraction_response(response, &fields(), 3).unwrap();
        let evidence = candidates[1].evidence.as_ref().unwrap();
        assert_eq!(evidence.page_index, 2);
        assert_eq!(evidence.snippet_text, "Grand total due: 10");
    }

    #[test]
    fn test_page_clamped_to_document() {
        let response = r#"{"invoiceNumber": {"value": "A", "page": 9, "snippet": "A"}}"#;
        let candidates = parse_extraction_response(response, &fields(), 2).unwrap();
        assert_eq!(candidates[0].evidence.as_ref().unwrap().page_index, 1);
    }

    #[test]
    fn test_page_as_string_or_whole_float() {
        let response = r#"{
            "invoiceNumber": {"value": "A", "page": "3", "snippet": "No. A"},
            "total": {"value": "10", "page": 2.0, "snippet": "Total 10"},
            "dueDate": {"value": "2024-03-01", "pageIndex": "1", "snippet": "Due 2024-03-01"}
        }"#;
        let candidates = parse_extraction_response(response, &fields(), 3).unwrap();
        let pages: Vec<usize> = candidates
            .iter()
            .map(|c| c.evidence.as_ref().unwrap().page_index)
            .collect();
        assert_eq!(pages, vec![2, 1, 1]);
    }

    #[test]
    fn test_unreadable_page_falls_back_to_first() {
        let response = r#"{"total": {"value": 10, "page": "second", "snippet": "Total 10"}}"#;
        let candidates = parse_extraction_response(response, &fields(), 3).unwrap();
        assert_eq!(candidates[1].evidence.as_ref().unwrap().page_index, 0);

        assert_eq!(whole_number(&json!(2.5)), None);
        assert_eq!(whole_number(&json!(-1)), None);
        assert_eq!(whole_number(&json!(" 4 ")), Some(4));
    }

    #[test]
    fn test_case_insensitive_keys_and_wrapper() {
        let response = r#"{"fields": {"InvoiceNumber": {"value": "Z", "snippet": "Z"}}}"#;
        let candidates = parse_extraction_response(response, &fields(), 1).unwrap();
        assert_eq!(candidates[0].value, Some(json!("Z")));
    }

    #[test]
    fn test_no_json_is_malformed() {
        let err = parse_extraction_response("I could not find anything.", &fields(), 1).unwrap_err();
        assert_eq!(err.reason(), "malformed_model_output");
    }

    #[test]
    fn test_array_root_is_malformed() {
        let err = parse_json_object("[1, 2]").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedModelOutput(_)));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_json_object("{not: json}").unwrap_err();
        assert_eq!(err.reason(), "malformed_model_output");
    }
}
