//! Concurrency-limited batch runner.
//!
//! `N` workers share one atomic cursor over the batch. Each worker claims the
//! next index, scans it, reports progress, and claims again until the cursor
//! runs past the end. Results are placed back at their input index, so the
//! returned vector lines up with the batch no matter which URL finished first.

use crate::error::{Result, ScanError};
use crate::orchestrator::ScanOrchestrator;
use futures::future::join_all;
use sitescan_core::{Keyword, ScanResult, ScanSummary, ScanningConfig, MAX_CONCURRENCY};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// An ordered set of URLs scanned for one keyword under one concurrency bound.
#[derive(Debug, Clone)]
pub struct ScanBatch {
    urls: Vec<String>,
    keyword: Keyword,
    concurrency: usize,
}

impl ScanBatch {
    /// Validate a submission using the default limits (20, capped at 50).
    pub fn new<I, S>(urls: I, keyword: &str, concurrency: Option<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_limits(urls, keyword, concurrency, &ScanningConfig::default())
    }

    /// Validate a submission.
    ///
    /// URLs are trimmed and blank entries dropped; the keyword is trimmed.
    /// A missing concurrency uses the configured default; every value is
    /// clamped to the configured ceiling and never exceeds [`MAX_CONCURRENCY`].
    pub fn with_limits<I, S>(
        urls: I,
        keyword: &str,
        concurrency: Option<usize>,
        limits: &ScanningConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.as_ref().trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(ScanError::NoUrls);
        }

        let keyword = Keyword::new(keyword)?;

        let requested = concurrency.unwrap_or(limits.default_concurrency);
        if requested == 0 {
            return Err(ScanError::InvalidConcurrency(requested));
        }

        Ok(Self {
            urls,
            keyword,
            concurrency: requested
                .min(limits.max_concurrency.max(1))
                .min(MAX_CONCURRENCY),
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// Concurrency after clamping to the ceiling.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Workers actually started: never more than there are URLs.
    pub fn worker_count(&self) -> usize {
        self.concurrency.min(self.urls.len())
    }
}

/// Drives the orchestrator over a whole batch.
#[derive(Clone)]
pub struct BatchRunner {
    orchestrator: ScanOrchestrator,
}

impl BatchRunner {
    #[must_use]
    pub fn new(orchestrator: ScanOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Scan every URL. `on_progress(result, completed, total)` runs once per
    /// URL in completion order.
    pub async fn run<F>(&self, batch: &ScanBatch, on_progress: F) -> Vec<ScanResult>
    where
        F: Fn(&ScanResult, usize, usize) + Sync,
    {
        self.run_until_cancelled(batch, &CancellationToken::new(), on_progress)
            .await
    }

    /// Like [`run`](Self::run), but workers stop claiming URLs once `cancel`
    /// fires. Scans already in flight finish; URLs never claimed come back as
    /// cancelled errors so the output still lines up with the input.
    pub async fn run_until_cancelled<F>(
        &self,
        batch: &ScanBatch,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Vec<ScanResult>
    where
        F: Fn(&ScanResult, usize, usize) + Sync,
    {
        let total = batch.len();
        let workers = batch.worker_count();
        info!(
            total,
            workers,
            keyword = %batch.keyword(),
            "Starting scan batch"
        );

        let cursor = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);

        let cursor = &cursor;
        let completed = &completed;
        let on_progress = &on_progress;

        let finished = join_all((0..workers).map(|worker| async move {
            let mut scanned = Vec::new();
            loop {
                if cancel.is_cancelled() {
                    debug!(worker, "Batch cancelled, worker stopping");
                    break;
                }

                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(url) = batch.urls().get(index) else {
                    break;
                };

                let result = self.orchestrator.scan_url(url, batch.keyword()).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                on_progress(&result, done, total);
                scanned.push((index, result));
            }
            scanned
        }))
        .await;

        let mut slots: Vec<Option<ScanResult>> = vec![None; total];
        for (index, result) in finished.into_iter().flatten() {
            slots[index] = Some(result);
        }

        let results: Vec<ScanResult> = slots
            .into_iter()
            .zip(batch.urls())
            .map(|(slot, url)| slot.unwrap_or_else(|| ScanResult::cancelled(url.as_str())))
            .collect();

        let summary = ScanSummary::from_results(&results);
        info!(
            total = summary.total,
            found = summary.found,
            not_found = summary.not_found,
            errors = summary.errors,
            skipped = summary.skipped,
            cancelled = cancel.is_cancelled(),
            "Scan batch finished"
        );

        results
    }
}
