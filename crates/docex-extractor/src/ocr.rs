//! Concurrent per-page OCR with ordered fan-in

use crate::error::ExtractionError;
use docex_domain::{OcrEngine, OcrInput, OcrPage};
use docex_normalizer::Page;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

/// OCR every page that has image content
///
/// At most `concurrency` calls run at once. Results come back sorted by page
/// index regardless of completion order. The first failure aborts the
/// remaining calls; dropping the returned future aborts them too.
pub async fn recognize_pages(
    engine: Arc<dyn OcrEngine>,
    pages: &[Page],
    concurrency: usize,
    call_timeout: Duration,
) -> Result<Vec<OcrPage>, ExtractionError> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for page in pages {
        let Some(image) = &page.image else { continue };
        let input = OcrInput {
            page_index: page.index,
            media_type: image.media_type.clone(),
            data: image.data.as_ref().clone(),
        };
        let engine = Arc::clone(&engine);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| ExtractionError::ModelUnavailable("OCR pool closed".to_string()))?;
            let ms = call_timeout.as_millis() as u64;
            timeout(call_timeout, engine.recognize(&input))
                .await
                .map_err(|_| ExtractionError::Timeout(ms))?
                .map_err(|e| match ExtractionError::from(e) {
                    ExtractionError::MalformedModelOutput(msg) => {
                        ExtractionError::ModelUnavailable(format!("OCR page {}: {}", input.page_index, msg))
                    }
                    other => other,
                })
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(page)) => {
                debug!(page = page.page_index, chars = page.text.len(), "OCR page complete");
                results.push(page);
            }
            Ok(Err(e)) => {
                warn!("OCR failed, aborting remaining pages: {}", e);
                tasks.abort_all();
                return Err(e);
            }
            Err(join_error) => {
                tasks.abort_all();
                return Err(ExtractionError::ModelUnavailable(format!("OCR task failed: {}", join_error)));
            }
        }
    }

    results.sort_by_key(|p| p.page_index);
    Ok(results)
}

/// Combine normalized page text with OCR output, page by page
pub fn merge_page_text(pages: &[Page], ocr: &[OcrPage]) -> Vec<String> {
    pages
        .iter()
        .map(|page| {
            let recognized = ocr
                .iter()
                .find(|o| o.page_index == page.index)
                .map(|o| o.text.trim())
                .unwrap_or("");
            let existing = page.text.trim();
            match (existing.is_empty(), recognized.is_empty()) {
                (true, _) => recognized.to_string(),
                (false, true) => existing.to_string(),
                (false, false) if recognized.contains(existing) => recognized.to_string(),
                (false, false) => format!("{}\n{}", existing, recognized),
            }
        })
        .collect()
}
