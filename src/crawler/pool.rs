//! Fixed-size fetch worker pool
//!
//! Targets are pushed into a bounded queue shared by a fixed number of worker
//! tasks. Each worker takes one target, fetches it, turns the outcome into a
//! [`FetchResult`] and sends it to the result channel before taking the next
//! target. Results are collected once every worker has finished, in the order
//! they completed.

use crate::config::DEFAULT_SNIPPET_CHARS;
use crate::crawler::fetcher::Fetch;
use crate::crawler::record::FetchResult;
use crate::targets::FetchTarget;
use crate::HarvestError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// A fixed-width pool of fetch workers
pub struct FetchPool<F> {
    fetcher: Arc<F>,
    workers: usize,
    snippet_chars: usize,
}

impl<F> FetchPool<F>
where
    F: Fetch + 'static,
{
    /// Creates a pool of `workers` tasks (at least one)
    pub fn new(fetcher: F, workers: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            workers: workers.max(1),
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }

    /// Sets the snippet length, in characters
    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    /// Fetches every target and returns one result per non-blank target
    ///
    /// Individual fetch failures are recorded as results and never abort the
    /// batch. Blank entries are dropped without producing a result.
    ///
    /// # Arguments
    ///
    /// * `targets` - The URIs to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<FetchResult>)` - Results in completion order
    /// * `Err(HarvestError::NoTargets)` - `targets` is empty
    /// * `Err(HarvestError::Worker)` - A worker task panicked
    pub async fn run<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<FetchResult>, HarvestError> {
        if targets.is_empty() {
            return Err(HarvestError::NoTargets);
        }

        let queued: Vec<String> = targets
            .iter()
            .filter_map(|t| FetchTarget::new(t.as_ref()))
            .map(FetchTarget::into_string)
            .collect();

        let skipped = targets.len() - queued.len();
        if skipped > 0 {
            tracing::debug!("Skipping {} blank targets", skipped);
        }

        tracing::info!(
            "Fetching {} targets with {} workers",
            queued.len(),
            self.workers
        );

        let (queue_tx, queue_rx) = mpsc::channel::<String>(self.workers * 2);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<FetchResult>();

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let queue = Arc::clone(&queue_rx);
            let results = result_tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let snippet_chars = self.snippet_chars;

            handles.push(tokio::spawn(async move {
                let mut processed = 0usize;
                loop {
                    let next = queue.lock().await.recv().await;
                    let Some(uri) = next else {
                        break;
                    };

                    let result = fetch_one(fetcher.as_ref(), &uri, snippet_chars).await;
                    processed += 1;

                    if results.send(result).is_err() {
                        break;
                    }
                }
                tracing::trace!("Worker {} done after {} targets", worker_id, processed);
            }));
        }
        drop(result_tx);

        for uri in queued {
            // Fails only once every worker has exited
            if queue_tx.send(uri).await.is_err() {
                break;
            }
        }
        drop(queue_tx);

        for handle in handles {
            handle
                .await
                .map_err(|e| HarvestError::Worker(e.to_string()))?;
        }

        let mut results = Vec::new();
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }

        Ok(results)
    }
}

async fn fetch_one<F: Fetch + ?Sized>(fetcher: &F, uri: &str, snippet_chars: usize) -> FetchResult {
    match fetcher.fetch(uri).await {
        Ok(page) => {
            tracing::debug!(
                "Fetched {}: status {}, {} bytes",
                uri,
                page.status_code,
                page.content_length
            );
            FetchResult::from_page(uri, page, snippet_chars)
        }
        Err(e) => {
            let result = FetchResult::from_error(uri, &e);
            tracing::warn!("{}", result.snippet);
            result
        }
    }
}
