//! Text extraction on a blocking worker thread with an overall timeout
//!
//! PDF parsing is CPU-bound and can hang on malformed input, so it never runs
//! on the async executor. The job is moved to a blocking thread and its result
//! comes back over a oneshot channel. When the timeout fires the receiver is
//! dropped and the thread's eventual result is discarded.

use crate::documents::extractor::extract_text;
use crate::ExtractError;
use std::time::Duration;
use tokio::sync::oneshot;

/// A unit of extraction work
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    /// Document URL, for logs and errors
    pub url: String,

    /// Downloaded PDF bytes
    pub bytes: Vec<u8>,
}

/// Runs [`extract_text`] for `job` on a blocking worker
///
/// # Errors
///
/// * [`ExtractError::Load`] - the worker could not read the document
/// * [`ExtractError::Timeout`] - no result within `timeout`
/// * [`ExtractError::WorkerFailed`] - the worker panicked or vanished
pub async fn extract_isolated(
    job: ExtractionJob,
    page_cap: usize,
    timeout: Duration,
) -> Result<String, ExtractError> {
    let (sender, receiver) = oneshot::channel();
    let ExtractionJob { url, bytes } = job;

    let worker = tokio::task::spawn_blocking(move || {
        let result = extract_text(&bytes, page_cap);
        // The receiver is gone if the caller already timed out
        let _ = sender.send(result);
    });

    match tokio::time::timeout(timeout, receiver).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => {
            let message = match worker.await {
                Err(e) if e.is_panic() => "worker panicked".to_string(),
                Err(e) => e.to_string(),
                Ok(()) => "worker exited without a result".to_string(),
            };
            tracing::warn!("Extraction worker failed for {}: {}", url, message);
            Err(ExtractError::WorkerFailed { url, message })
        }
        Err(_) => {
            tracing::warn!("Extraction timed out for {} after {:?}", url, timeout);
            Err(ExtractError::Timeout {
                url,
                after: timeout,
            })
        }
    }
}
