//! Parsing of verification responses

use crate::error::ValidationPhaseError;
use docex_domain::ReasonCode;
use docex_extractor::parse_json_object;
use serde_json::Value;

/// Score and reason read from one verification response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Score clamped to [0, 1]
    pub score: f64,
    /// Reason code, derived from the score when the model omitted it
    pub reason_code: ReasonCode,
}

/// Parse a verification response
///
/// Accepts `score` or `confidence`, as a number or numeric string. A missing
/// reason code is derived from the score.
pub fn parse_verdict(response: &str) -> Result<Verdict, ValidationPhaseError> {
    let object =
        parse_json_object(response).map_err(|e| ValidationPhaseError::MalformedOutput(e.to_string()))?;

    let raw = ["score", "confidence"]
        .iter()
        .find_map(|key| object.get(*key))
        .ok_or_else(|| ValidationPhaseError::MalformedOutput("response has no score".to_string()))?;

    let score = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok().map(|v| {
            if s.trim().ends_with('%') {
                v / 100.0
            } else {
                v
            }
        }),
        _ => None,
    }
    .filter(|s| s.is_finite())
    .ok_or_else(|| ValidationPhaseError::MalformedOutput(format!("score is not a number: {}", raw)))?;

    let score = score.clamp(0.0, 1.0);

    let reason_code = ["reasonCode", "reason_code", "reason"]
        .iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_str)
        .find_map(ReasonCode::parse)
        .unwrap_or_else(|| derive_reason(score));

    Ok(Verdict { score, reason_code })
}

fn derive_reason(score: f64) -> ReasonCode {
    if score >= 0.7 {
        ReasonCode::StrongMatch
    } else if score > 0.0 {
        ReasonCode::WeakMatch
    } else {
        ReasonCode::Contradicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_plain() {
        let v = parse_verdict(r#"{"score": 0.92, "reasonCode": "strong_match"}"#).unwrap();
        assert_eq!(v.score, 0.92);
        assert_eq!(v.reason_code, ReasonCode::StrongMatch);
    }

    #[test]
    fn test_parse_fenced_with_aliases() {
        let v = parse_verdict("```json\n{\"confidence\": \"0.6\", \"reason\": \"weak match\"}\n```").unwrap();
        assert_eq!(v.score, 0.6);
        assert_eq!(v.reason_code, ReasonCode::WeakMatch);
    }

    #[test]
    fn test_percentage_string() {
        let v = parse_verdict(r#"{"score": "85%"}"#).unwrap();
        assert!((v.score - 0.85).abs() < 1e-9);
        assert_eq!(v.reason_code, ReasonCode::StrongMatch);
    }

    #[test]
    fn test_derived_reason() {
        assert_eq!(parse_verdict(r#"{"score": 0}"#).unwrap().reason_code, ReasonCode::Contradicted);
        assert_eq!(parse_verdict(r#"{"score": 0.3}"#).unwrap().reason_code, ReasonCode::WeakMatch);
    }

    #[test]
    fn test_missing_score_is_malformed() {
        let err = parse_verdict(r#"{"reasonCode": "strong_match"}"#).unwrap_err();
        assert_eq!(err.reason(), "malformed_validation_output");
        assert!(parse_verdict("not json").is_err());
        assert!(parse_verdict(r#"{"score": true}"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_score_always_in_unit_interval(raw in -1.0e6f64..1.0e6) {
            let v = parse_verdict(&format!("{{\"score\": {}}}", raw)).unwrap();
            prop_assert!((0.0..=1.0).contains(&v.score));
        }
    }
}
