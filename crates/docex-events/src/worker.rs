//! Event worker: `requested` in, `completed`/`failed` out

use crate::envelope::DocumentEvent;
use crate::metrics::EventMetrics;
use docex_orchestrator::Orchestrator;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Runs one pipeline task per requested event
///
/// Requests run concurrently; each reply is sent as soon as its request
/// finishes, so replies may come out of order. Correlate on `requestId`.
///
/// # Examples
///
/// ```no_run
/// use docex_events::{DocumentEvent, EventWorker};
/// use docex_orchestrator::{Collaborators, Orchestrator, Settings};
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = Settings::load(None)?;
///     let collaborators = Collaborators::from_settings(&settings)?;
///     let worker = EventWorker::new(Arc::new(Orchestrator::new(&settings, &collaborators)));
///
///     let (inbox_tx, inbox) = mpsc::channel::<DocumentEvent>(16);
///     let (outbox, mut replies) = mpsc::channel::<DocumentEvent>(16);
///     drop(inbox_tx);
///
///     worker.run(inbox, outbox, async { let _ = tokio::signal::ctrl_c().await; }).await;
///     while let Some(reply) = replies.recv().await {
///         println!("{}", reply.to_json()?);
///     }
///     Ok(())
/// }
/// ```
pub struct EventWorker {
    orchestrator: Arc<Orchestrator>,
    metrics: Arc<Mutex<EventMetrics>>,
}

fn lock(metrics: &Mutex<EventMetrics>) -> MutexGuard<'_, EventMetrics> {
    metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EventWorker {
    /// Create a worker around a shared orchestrator
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            metrics: Arc::new(Mutex::new(EventMetrics::new())),
        }
    }

    /// Process one inbound event
    ///
    /// Returns the reply for a `requested` event and `None` for anything else.
    pub async fn handle(&self, event: DocumentEvent) -> Option<DocumentEvent> {
        process(Arc::clone(&self.orchestrator), Arc::clone(&self.metrics), event).await
    }

    /// Consume `inbox` until it closes or `shutdown` resolves
    ///
    /// When the inbox closes, in-flight requests are drained first. On
    /// shutdown they are abandoned: their collaborator calls are dropped and
    /// no reply is sent.
    pub async fn run<F>(
        &self,
        mut inbox: mpsc::Receiver<DocumentEvent>,
        outbox: mpsc::Sender<DocumentEvent>,
        shutdown: F,
    ) -> EventMetrics
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut in_flight = JoinSet::new();
        let mut inbox_open = true;

        tracing::info!("Event worker started");

        loop {
            if !inbox_open && in_flight.is_empty() {
                break;
            }
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(in_flight = in_flight.len(), "Shutdown signal received, stopping event worker");
                    lock(&self.metrics).record_cancelled(in_flight.len());
                    in_flight.abort_all();
                    break;
                }
                event = inbox.recv(), if inbox_open => {
                    match event {
                        Some(event) => {
                            let orchestrator = Arc::clone(&self.orchestrator);
                            let metrics = Arc::clone(&self.metrics);
                            let outbox = outbox.clone();
                            in_flight.spawn(async move {
                                if let Some(reply) = process(orchestrator, metrics, event).await {
                                    if outbox.send(reply).await.is_err() {
                                        tracing::warn!("Reply dropped: outbound channel closed");
                                    }
                                }
                            });
                        }
                        None => {
                            tracing::debug!("Inbox closed, draining in-flight requests");
                            inbox_open = false;
                        }
                    }
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Request task failed: {}", e);
                    }
                }
            }
        }

        let metrics = self.metrics();
        tracing::info!("Event worker stopped. Final metrics:\n{}", metrics.summary());
        metrics
    }

    /// Snapshot of the worker's metrics
    pub fn metrics(&self) -> EventMetrics {
        lock(&self.metrics).clone()
    }

    /// Reset the worker's metrics counters
    pub fn reset_metrics(&self) {
        lock(&self.metrics).reset();
    }
}

async fn process(
    orchestrator: Arc<Orchestrator>,
    metrics: Arc<Mutex<EventMetrics>>,
    event: DocumentEvent,
) -> Option<DocumentEvent> {
    let (request_id, payload) = match event {
        DocumentEvent::Requested { request_id, payload } => (request_id, payload),
        other => {
            tracing::warn!(event_type = other.event_type(), request_id = %other.request_id(), "Ignoring non-request event");
            lock(&metrics).record_ignored();
            return None;
        }
    };

    lock(&metrics).record_requested();
    tracing::info!(%request_id, fields = payload.data_elements.len(), "Extraction requested");

    let started = Instant::now();
    let report = orchestrator.run_report(payload.into_request()).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &report.failure {
        Some(failure) => lock(&metrics).record_failed(failure.phase, elapsed_ms),
        None => lock(&metrics).record_completed(report.result.success, elapsed_ms),
    }

    let reply = DocumentEvent::from_report(request_id, report);
    tracing::info!(%request_id, event_type = reply.event_type(), elapsed_ms, "Extraction finished");
    Some(reply)
}
