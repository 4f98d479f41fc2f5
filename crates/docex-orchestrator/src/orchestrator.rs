//! Request state machine
//!
//! `Intake → Classifying → Routing → Extracting → Validating → Assembling`,
//! ending in `Completed` or `Failed`. Each phase reads what earlier phases
//! produced and adds its own record to the request-scoped state.

use crate::collaborators::Collaborators;
use crate::error::IntakeError;
use crate::failure::{below_threshold, PhaseFailure};
use crate::settings::Settings;
use docex_domain::{
    ClassificationMetadata, ErrorRecord, ExtractionRequest, ExtractionResult, FieldCandidate, FieldConfidence,
    FieldSpec, OcrEngine, Phase, ReasonCode, StrategyDecision, StrategyId,
};
use docex_extractor::{ExtractionError, FieldExtractor};
use docex_normalizer::{NormalizedDocument, Normalizer};
use docex_router::StrategyRouter;
use docex_validator::{overall_confidence, ConfidenceValidator};
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Extraction retries allowed per request
pub const MAX_EXTRACTION_RETRIES: u32 = 1;

/// Everything a request has produced so far
#[derive(Debug, Default)]
struct RequestState {
    classification: Option<ClassificationMetadata>,
    decision: Option<StrategyDecision>,
    candidates: Vec<FieldCandidate>,
    confidences: Vec<FieldConfidence>,
    extraction_attempts: u32,
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// The assembled response
    pub result: ExtractionResult,
    /// The hard failure that ended the request in `Failed`, if any
    pub failure: Option<PhaseFailure>,
    /// Extraction calls made, including the retry
    pub extraction_attempts: u32,
}

impl RunReport {
    /// Whether the request ended in `Failed` rather than `Completed`
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Runs one request through every phase exactly once
pub struct Orchestrator {
    normalizer: Normalizer,
    router: StrategyRouter,
    extractor: FieldExtractor,
    validator: ConfidenceValidator,
    ocr: Option<Arc<dyn OcrEngine>>,
    ocr_probe_timeout: Duration,
    retry_backoff: Duration,
}

impl Orchestrator {
    /// Wire the pipeline from settings and a collaborator pool
    pub fn new(settings: &Settings, collaborators: &Collaborators) -> Self {
        Self {
            normalizer: Normalizer::new(settings.normalizer_config()),
            router: StrategyRouter::new(),
            extractor: FieldExtractor::new(
                Arc::clone(&collaborators.text_model),
                Arc::clone(&collaborators.vision_model),
                collaborators.ocr.clone(),
                settings.extractor.clone(),
            ),
            validator: ConfidenceValidator::new(
                Arc::clone(&collaborators.validation_model),
                settings.validation_config(),
            ),
            ocr: collaborators.ocr.clone(),
            ocr_probe_timeout: Duration::from_millis(settings.ocr.probe_timeout_ms),
            retry_backoff: settings.retry_backoff(),
        }
    }

    /// Process one request
    ///
    /// Never fails: every failure is reported inside the result, tagged with
    /// its phase, alongside whatever the earlier phases produced.
    pub async fn run(&self, request: ExtractionRequest) -> ExtractionResult {
        self.run_report(request).await.result
    }

    /// Process one request, keeping the terminal failure apart from the result
    pub async fn run_report(&self, request: ExtractionRequest) -> RunReport {
        let started = Instant::now();
        let mut state = RequestState::default();

        let failure = self.drive(&request, &mut state).await.err();
        if let Some(failure) = &failure {
            warn!(
                phase = %failure.phase,
                reason = failure.reason,
                "Request failed"
            );
        }

        debug!(phase = %Phase::Assembling, "Entering phase");
        let extraction_attempts = state.extraction_attempts;
        let result = self.assemble(&request.fields, state, failure.as_ref());
        info!(
            success = result.success,
            failed_phase = ?result.failed_phase(),
            extraction_attempts,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request finished"
        );
        RunReport {
            result,
            failure,
            extraction_attempts,
        }
    }

    /// Process one request unless `cancel` resolves first
    ///
    /// On cancellation in-flight collaborator calls are dropped and `None`
    /// is returned.
    pub async fn run_until<F>(&self, request: ExtractionRequest, cancel: F) -> Option<RunReport>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                warn!("Request cancelled");
                None
            }
            report = self.run_report(request) => Some(report),
        }
    }

    async fn drive(&self, request: &ExtractionRequest, state: &mut RequestState) -> Result<(), PhaseFailure> {
        debug!(phase = %Phase::Intake, fields = request.fields.len(), "Entering phase");
        intake(request)?;

        debug!(phase = %Phase::Classifying, payload_bytes = request.payload.transport_len(), "Entering phase");
        let document = self.classify(request).await?;
        state.classification = Some(document.classification.clone());

        debug!(phase = %Phase::Routing, "Entering phase");
        let decision = self.route(&document.classification).await?;
        let strategy = decision.strategy_id;
        state.decision = Some(decision);

        debug!(phase = %Phase::Extracting, strategy = %strategy, "Entering phase");
        let candidates = self.extract(strategy, &document, &request.fields, state).await?;
        state.candidates = candidates;

        debug!(phase = %Phase::Validating, "Entering phase");
        let pages: Vec<String> = document.pages.iter().map(|p| p.text.clone()).collect();
        match self.validator.validate(&state.candidates, &request.fields, &pages).await {
            Ok(confidences) => {
                state.confidences = confidences;
                Ok(())
            }
            Err(failure) => {
                state.confidences = failure.confidences;
                Err(failure.error.into())
            }
        }
    }

    async fn classify(&self, request: &ExtractionRequest) -> Result<NormalizedDocument, PhaseFailure> {
        let normalizer = self.normalizer.clone();
        let payload = request.payload.clone();
        let file_type = request.file_type.clone();

        let document = tokio::task::spawn_blocking(move || normalizer.normalize(&payload, &file_type))
            .await
            .map_err(|e| {
                PhaseFailure::new(
                    Phase::Classifying,
                    "internal",
                    format!("Normalizer task failed: {}", e),
                    "Resubmit the request",
                )
            })??;

        info!(
            file_type = %document.classification.file_type,
            pages = document.classification.page_count,
            is_scanned = document.classification.is_scanned,
            "Document classified"
        );
        Ok(document)
    }

    async fn route(&self, classification: &ClassificationMetadata) -> Result<StrategyDecision, PhaseFailure> {
        let needs_ocr = self.router.matching_rule(classification).strategy() == StrategyId::OcrThenLlm;
        let ocr_available = needs_ocr && self.probe_ocr().await;
        Ok(self.router.decide(classification, ocr_available)?)
    }

    async fn probe_ocr(&self) -> bool {
        match &self.ocr {
            Some(engine) => timeout(self.ocr_probe_timeout, engine.is_available())
                .await
                .unwrap_or(false),
            None => false,
        }
    }

    async fn extract(
        &self,
        strategy: StrategyId,
        document: &NormalizedDocument,
        fields: &[FieldSpec],
        state: &mut RequestState,
    ) -> Result<Vec<FieldCandidate>, ExtractionError> {
        loop {
            state.extraction_attempts += 1;
            let attempt = state.extraction_attempts;
            match self.extractor.extract(strategy, document, fields).await {
                Ok(candidates) => return Ok(candidates),
                Err(e) if e.is_retryable() && attempt <= MAX_EXTRACTION_RETRIES => {
                    let backoff = self.retry_backoff * 2u32.pow(attempt - 1);
                    warn!(
                        attempt,
                        reason = e.reason(),
                        backoff_ms = backoff.as_millis() as u64,
                        "Extraction failed, retrying"
                    );
                    sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn assemble(&self, fields: &[FieldSpec], state: RequestState, failure: Option<&PhaseFailure>) -> ExtractionResult {
        let mut errors: Vec<ErrorRecord> = failure.into_iter().map(PhaseFailure::to_record).collect();
        for confidence in &state.confidences {
            if !confidence.passed && confidence.reason_code != ReasonCode::NoEvidence {
                let threshold = self.validator.config().threshold_for(&confidence.field_name);
                errors.push(below_threshold(&confidence.field_name, confidence.score, threshold));
            }
        }

        let validated = state.confidences.len() == fields.len();
        let success = failure.is_none() && validated && state.confidences.iter().all(|c| c.passed);

        let mut extracted_data = BTreeMap::new();
        let mut provenance = BTreeMap::new();
        for candidate in state.candidates {
            if let (Some(value), Some(evidence)) = (candidate.value, candidate.evidence) {
                extracted_data.insert(candidate.field_name.clone(), value);
                provenance.insert(candidate.field_name, evidence);
            }
        }

        ExtractionResult {
            success,
            document_type: state.classification.as_ref().map(Into::into),
            extraction_strategy: state.decision,
            extracted_data,
            overall_confidence: overall_confidence(&state.confidences),
            confidence_per_field: state
                .confidences
                .into_iter()
                .map(|c| (c.field_name.clone(), c))
                .collect(),
            provenance,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

fn intake(request: &ExtractionRequest) -> Result<(), IntakeError> {
    if request.fields.is_empty() {
        return Err(IntakeError::EmptyFieldSet);
    }
    if request.payload.is_empty() {
        return Err(IntakeError::MissingPayload);
    }
    let mut seen = HashSet::new();
    for (index, field) in request.fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            return Err(IntakeError::EmptyFieldName(index));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(IntakeError::DuplicateFieldName(field.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docex_domain::DocumentPayload;

    fn request(fields: Vec<FieldSpec>) -> ExtractionRequest {
        ExtractionRequest::new(DocumentPayload::Bytes(b"%PDF-1.4".to_vec()), "pdf", fields)
    }

    #[test]
    fn test_intake_accepts_well_formed_request() {
        assert!(intake(&request(vec![FieldSpec::new("a", ""), FieldSpec::new("b", "")])).is_ok());
    }

    #[test]
    fn test_intake_rejections() {
        assert_eq!(intake(&request(vec![])), Err(IntakeError::EmptyFieldSet));
        assert_eq!(
            intake(&request(vec![FieldSpec::new("a", ""), FieldSpec::new(" ", "")])),
            Err(IntakeError::EmptyFieldName(1))
        );
        assert_eq!(
            intake(&request(vec![FieldSpec::new("a", ""), FieldSpec::new("a", "")])),
            Err(IntakeError::DuplicateFieldName("a".to_string()))
        );

        let empty = ExtractionRequest::new(DocumentPayload::Base64("  ".to_string()), "pdf", vec![FieldSpec::new("a", "")]);
        assert_eq!(intake(&empty), Err(IntakeError::MissingPayload));
    }
}
