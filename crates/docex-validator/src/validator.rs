//! Confidence scoring and threshold gating

use crate::config::ValidationConfig;
use crate::error::{ValidationFailure, ValidationPhaseError};
use crate::prompt::VerificationPrompt;
use crate::verdict::{parse_verdict, Verdict};
use docex_domain::{FieldCandidate, FieldConfidence, FieldSpec, LanguageModel, ModelRequest, ReasonCode};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Scores every candidate with an independent verification call
pub struct ConfidenceValidator {
    model: Arc<dyn LanguageModel>,
    config: ValidationConfig,
}

impl ConfidenceValidator {
    /// Create a validator over `model`
    pub fn new(model: Arc<dyn LanguageModel>, config: ValidationConfig) -> Self {
        Self { model, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Score `candidates` against `fields`
    ///
    /// Returns one confidence per field, in field order. Absent candidates
    /// score 0 with `no_evidence` and cost no model call. `pages` is the page
    /// text used as context for the cited page, when available.
    ///
    /// A failed verification call or a required field with no evidence fails
    /// the phase; the failure still carries every confidence computed.
    pub async fn validate(
        &self,
        candidates: &[FieldCandidate],
        fields: &[FieldSpec],
        pages: &[String],
    ) -> Result<Vec<FieldConfidence>, ValidationFailure> {
        if fields.is_empty() {
            return Err(ValidationFailure::bare(ValidationPhaseError::EmptyFieldSet));
        }

        let by_name: HashMap<&str, &FieldCandidate> =
            candidates.iter().map(|c| (c.field_name.as_str(), c)).collect();

        let verdicts: Vec<Option<Result<Verdict, ValidationPhaseError>>> = stream::iter(fields)
            .map(|field| {
                let candidate = by_name.get(field.name.as_str()).copied().filter(|c| c.is_present());
                async move {
                    match candidate {
                        Some(candidate) => Some(self.verify(field, candidate, pages).await),
                        None => None,
                    }
                }
            })
            .buffered(self.config.max_concurrent_calls.max(1))
            .collect::<Vec<_>>()
            .boxed()
            .await;

        let mut confidences = Vec::with_capacity(fields.len());
        let mut first_error = None;
        for (field, verdict) in fields.iter().zip(verdicts) {
            match verdict {
                None => confidences.push(FieldConfidence::no_evidence(&field.name, field.required)),
                Some(Ok(verdict)) => confidences.push(self.gate(field, verdict)),
                Some(Err(e)) => {
                    warn!(field = %field.name, reason = e.reason(), "Verification call failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(error) = first_error {
            return Err(ValidationFailure { error, confidences });
        }

        let missing: Vec<String> = fields
            .iter()
            .zip(&confidences)
            .filter(|(field, c)| field.required && c.score == 0.0 && c.reason_code == ReasonCode::NoEvidence)
            .map(|(field, _)| field.name.clone())
            .collect();
        if !missing.is_empty() {
            info!(fields = ?missing, "Required fields have no evidence");
            return Err(ValidationFailure {
                error: ValidationPhaseError::ZeroConfidenceRequiredField(missing),
                confidences,
            });
        }

        info!(
            fields = confidences.len(),
            passed = confidences.iter().filter(|c| c.passed).count(),
            "Validation complete"
        );
        Ok(confidences)
    }

    fn gate(&self, field: &FieldSpec, verdict: Verdict) -> FieldConfidence {
        let threshold = self.config.threshold_for(&field.name);
        FieldConfidence {
            field_name: field.name.clone(),
            score: verdict.score,
            reason_code: verdict.reason_code,
            passed: !field.required || verdict.score >= threshold,
        }
    }

    async fn verify(
        &self,
        field: &FieldSpec,
        candidate: &FieldCandidate,
        pages: &[String],
    ) -> Result<Verdict, ValidationPhaseError> {
        let page_text = candidate
            .evidence
            .as_ref()
            .and_then(|e| pages.get(e.page_index))
            .map(String::as_str);
        let prompt = VerificationPrompt::new(field, candidate).with_page_text(page_text);
        let request = ModelRequest::text(
            prompt.system(self.config.prompt_template.as_deref()),
            prompt.prompt(self.config.max_snippet_chars, self.config.max_context_chars),
        );

        debug!(field = %field.name, model = self.model.name(), "Calling validation model");

        let response = timeout(self.config.call_timeout(), self.model.generate(&request))
            .await
            .map_err(|_| ValidationPhaseError::Timeout(self.config.call_timeout_ms))??;

        parse_verdict(&response)
    }
}

/// Mean score across fields, `None` when there are none
pub fn overall_confidence(confidences: &[FieldConfidence]) -> Option<f64> {
    if confidences.is_empty() {
        return None;
    }
    Some(confidences.iter().map(|c| c.score).sum::<f64>() / confidences.len() as f64)
}
