//! Value typing per field format
//!
//! Values that cannot be converted keep their raw text; blank values become
//! absent.

use chrono::NaiveDate;
use docex_domain::FieldFormat;
use serde_json::{Number, Value};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Convert a raw model value to the field's format
///
/// Returns `None` when the value is null or blank.
pub fn coerce_value(raw: &Value, format: &FieldFormat) -> Option<Value> {
    let raw = match raw {
        Value::Null => return None,
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) if is_null_word(s) => return None,
        other => other,
    };

    let coerced = match format {
        FieldFormat::String => Some(match raw {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => Value::String(other.to_string()),
        }),
        FieldFormat::Number => to_number(raw),
        FieldFormat::Integer => to_integer(raw),
        FieldFormat::Date => raw.as_str().and_then(to_iso_date),
        FieldFormat::Boolean => to_bool(raw),
        FieldFormat::Other(_) => Some(raw.clone()),
    };

    Some(coerced.unwrap_or_else(|| raw.clone()))
}

fn is_null_word(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "null" | "none" | "n/a")
}

fn numeric_text(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect()
}

fn to_number(raw: &Value) -> Option<Value> {
    match raw {
        Value::Number(_) => Some(raw.clone()),
        Value::String(s) => {
            let parsed: f64 = numeric_text(s).parse().ok()?;
            let negative = s.trim().starts_with('(') && s.trim().ends_with(')');
            let value = if negative { -parsed.abs() } else { parsed };
            Number::from_f64(value).map(Value::Number)
        }
        _ => None,
    }
}

fn to_integer(raw: &Value) -> Option<Value> {
    let n = to_number(raw)?.as_f64()?;
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        None
    }
}

fn to_iso_date(s: &str) -> Option<Value> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
}

fn to_bool(raw: &Value) -> Option<Value> {
    match raw {
        Value::Bool(_) => Some(raw.clone()),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "x" | "checked" => Some(Value::Bool(true)),
            "false" | "no" | "n" | "unchecked" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| Value::Bool(i != 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_and_null_are_absent() {
        assert_eq!(coerce_value(&Value::Null, &FieldFormat::String), None);
        assert_eq!(coerce_value(&json!("  "), &FieldFormat::String), None);
        assert_eq!(coerce_value(&json!("N/A"), &FieldFormat::Number), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(coerce_value(&json!("$1,250.50"), &FieldFormat::Number), Some(json!(1250.5)));
        assert_eq!(coerce_value(&json!("(20.00)"), &FieldFormat::Number), Some(json!(-20.0)));
        assert_eq!(coerce_value(&json!(7), &FieldFormat::Number), Some(json!(7)));
        assert_eq!(coerce_value(&json!("1,024"), &FieldFormat::Integer), Some(json!(1024)));
        assert_eq!(coerce_value(&json!("about ten"), &FieldFormat::Number), Some(json!("about ten")));
    }

    #[test]
    fn test_dates_normalized() {
        assert_eq!(coerce_value(&json!("03/15/2024"), &FieldFormat::Date), Some(json!("2024-03-15")));
        assert_eq!(coerce_value(&json!("March 5, 2024"), &FieldFormat::Date), Some(json!("2024-03-05")));
        assert_eq!(coerce_value(&json!("Q3 2024"), &FieldFormat::Date), Some(json!("Q3 2024")));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(coerce_value(&json!("Yes"), &FieldFormat::Boolean), Some(json!(true)));
        assert_eq!(coerce_value(&json!(false), &FieldFormat::Boolean), Some(json!(false)));
        assert_eq!(coerce_value(&json!("maybe"), &FieldFormat::Boolean), Some(json!("maybe")));
    }

    #[test]
    fn test_strings_trimmed() {
        assert_eq!(coerce_value(&json!(" INV-1 "), &FieldFormat::String), Some(json!("INV-1")));
        assert_eq!(coerce_value(&json!(42), &FieldFormat::String), Some(json!("42")));
    }
}
