//! Metrics collection for the event worker

use docex_domain::Phase;
use std::collections::HashMap;

/// Counters kept by the event worker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMetrics {
    /// `requested` events accepted
    pub requested: usize,

    /// `completed` events emitted
    pub completed: usize,

    /// `completed` events whose result reported `success: true`
    pub succeeded: usize,

    /// `failed` events emitted
    pub failed: usize,

    /// Failures per originating phase
    pub failures_by_phase: HashMap<Phase, usize>,

    /// Requests abandoned at shutdown
    pub cancelled: usize,

    /// Inbound events that were not requests
    pub ignored: usize,

    /// Total time spent processing requests (milliseconds)
    pub total_processing_ms: u64,
}

impl EventMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted request
    pub fn record_requested(&mut self) {
        self.requested += 1;
    }

    /// Record a completed request
    pub fn record_completed(&mut self, success: bool, elapsed_ms: u64) {
        self.completed += 1;
        if success {
            self.succeeded += 1;
        }
        self.total_processing_ms += elapsed_ms;
    }

    /// Record a failed request
    pub fn record_failed(&mut self, phase: Phase, elapsed_ms: u64) {
        self.failed += 1;
        *self.failures_by_phase.entry(phase).or_insert(0) += 1;
        self.total_processing_ms += elapsed_ms;
    }

    /// Record requests dropped at shutdown
    pub fn record_cancelled(&mut self, count: usize) {
        self.cancelled += count;
    }

    /// Record an inbound event that is not a request
    pub fn record_ignored(&mut self) {
        self.ignored += 1;
    }

    /// Requests that reached a terminal state
    pub fn finished(&self) -> usize {
        self.completed + self.failed
    }

    /// Mean processing time per finished request (milliseconds)
    pub fn average_processing_ms(&self) -> f64 {
        match self.finished() {
            0 => 0.0,
            n => self.total_processing_ms as f64 / n as f64,
        }
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Printable summary
    pub fn summary(&self) -> String {
        let mut phases: Vec<_> = self.failures_by_phase.iter().collect();
        phases.sort_by_key(|(phase, _)| phase.as_str());
        let phases = if phases.is_empty() {
            "none".to_string()
        } else {
            phases
                .iter()
                .map(|(phase, count)| format!("{}={}", phase, count))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "Requested: {}\nCompleted: {} ({} successful)\nFailed: {} ({})\nCancelled: {}\nIgnored: {}\nAverage processing: {:.1}ms",
            self.requested,
            self.completed,
            self.succeeded,
            self.failed,
            phases,
            self.cancelled,
            self.ignored,
            self.average_processing_ms()
        )
    }
}
