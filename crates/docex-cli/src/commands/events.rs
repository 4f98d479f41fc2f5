//! Events command implementation.
//!
//! Reads one `document.extraction.requested` event per stdin line and writes
//! each reply as one stdout line. Replies follow completion order, not input
//! order; correlate them by `requestId`.

use crate::cli::EventsArgs;
use crate::error::Result;
use crate::output::Formatter;
use docex_events::{DocumentEvent, EventWorker};
use docex_orchestrator::{Collaborators, Orchestrator, Settings};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

/// Execute the events command.
pub async fn execute_events(args: EventsArgs, settings: &Settings, formatter: &Formatter) -> Result<()> {
    let collaborators = Collaborators::from_settings(settings)?;
    let worker = EventWorker::new(Arc::new(Orchestrator::new(settings, &collaborators)));

    let (inbox_tx, inbox_rx) = mpsc::channel(args.queue.max(1));
    let (outbox_tx, mut outbox_rx) = mpsc::channel::<DocumentEvent>(args.queue.max(1));

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match DocumentEvent::from_json(&line) {
                Ok(event) => {
                    if inbox_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Skipping unreadable event line: {}", e),
            }
        }
        Ok::<_, std::io::Error>(())
    });

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = outbox_rx.recv().await {
            let mut line = reply.to_json()?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<_, crate::error::CliError>(())
    });

    let metrics = worker
        .run(inbox_rx, outbox_tx, async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await;

    reader.abort();
    match writer.await {
        Ok(result) => result?,
        Err(e) => warn!("Writer task ended abnormally: {}", e),
    }

    collaborators.shutdown();
    eprintln!("{}", formatter.info("Event worker stopped"));
    eprintln!("{}", metrics.summary());
    Ok(())
}
