//! HTTP status mapping for pipeline outcomes

use axum::http::StatusCode;
use docex_domain::{ExtractionResult, Phase};

/// Status code for a finished run
///
/// Validation outcomes are answered with 200 and `success: false`; the
/// caller reads the per-field verdicts from the body.
pub fn status_for(result: &ExtractionResult) -> StatusCode {
    let Some(first) = result.errors.as_ref().and_then(|errors| errors.first()) else {
        return StatusCode::OK;
    };

    match (first.phase, first.reason.as_str()) {
        (Phase::Intake, _) => StatusCode::BAD_REQUEST,
        (Phase::Classifying, "unsupported_type") => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        (Phase::Classifying, _) => StatusCode::BAD_REQUEST,
        (Phase::Routing, _) => StatusCode::SERVICE_UNAVAILABLE,
        (Phase::Extracting, "model_unavailable") => StatusCode::SERVICE_UNAVAILABLE,
        (Phase::Extracting, "timeout") => StatusCode::GATEWAY_TIMEOUT,
        (Phase::Extracting, "malformed_model_output") => StatusCode::BAD_GATEWAY,
        (Phase::Extracting, _) => StatusCode::INTERNAL_SERVER_ERROR,
        (Phase::Validating, _) => StatusCode::OK,
        (Phase::Assembling, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
