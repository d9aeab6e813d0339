//! One batch run as a stream of progress events.
//!
//! A session emits exactly one `start`, one `progress` per URL in completion
//! order, and then exactly one terminal event: `complete` on success or
//! `error` if the run itself broke. The shared browser is released once,
//! after the terminal event, and only then does the stream close.

use crate::error::{Result, ScanError};
use crate::runner::{BatchRunner, ScanBatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitescan_browser::BrowserEngine;
use sitescan_core::{ScanResult, ScanSummary};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Event sent to the consumer of a running batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    /// The batch was accepted and workers are starting.
    Start {
        total: usize,
        keyword: String,
        concurrency: usize,
    },
    /// One more URL finished. `index` counts completions, starting at 1.
    Progress {
        index: usize,
        total: usize,
        result: ScanResult,
    },
    /// Every URL has a result, aligned with the input order.
    Complete {
        summary: ScanSummary,
        results: Vec<ScanResult>,
    },
    /// The batch aborted.
    Error { message: String },
}

impl ProgressEvent {
    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Shared state torn down when a session ends.
#[async_trait]
pub trait SessionResource: Send + Sync {
    async fn release(&self);
}

#[async_trait]
impl SessionResource for BrowserEngine {
    async fn release(&self) {
        BrowserEngine::release(self).await;
    }
}

/// A running batch.
///
/// Dropping the session drops the event receiver, which stops dispatch of
/// new URLs at the next progress send.
pub struct ScanSession {
    events: UnboundedReceiver<ProgressEvent>,
    handle: JoinHandle<Result<Vec<ScanResult>>>,
    cancel: CancellationToken,
}

impl ScanSession {
    /// Spawn the batch on the current runtime.
    pub fn start(
        runner: BatchRunner,
        resource: Arc<dyn SessionResource>,
        batch: ScanBatch,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let total = batch.len();
            let _ = tx.send(ProgressEvent::Start {
                total,
                keyword: batch.keyword().as_str().to_string(),
                concurrency: batch.concurrency(),
            });

            let progress_tx = tx.clone();
            let run_cancel = task_cancel.clone();
            let run = tokio::spawn(async move {
                runner
                    .run_until_cancelled(&batch, &run_cancel, |result, index, total| {
                        let event = ProgressEvent::Progress {
                            index,
                            total,
                            result: result.clone(),
                        };
                        if progress_tx.send(event).is_err() && !run_cancel.is_cancelled() {
                            debug!("Progress receiver dropped, cancelling batch");
                            run_cancel.cancel();
                        }
                    })
                    .await
            });

            let outcome = match run.await {
                Ok(results) => {
                    let summary = ScanSummary::from_results(&results);
                    let _ = tx.send(ProgressEvent::Complete {
                        summary,
                        results: results.clone(),
                    });
                    Ok(results)
                }
                Err(e) => {
                    let message = failure_message(e);
                    error!(error = %message, "Scan batch aborted");
                    let _ = tx.send(ProgressEvent::Error {
                        message: message.clone(),
                    });
                    Err(ScanError::BatchFailed(message))
                }
            };

            resource.release().await;
            drop(tx);
            outcome
        });

        Self {
            events,
            handle,
            cancel,
        }
    }

    /// Next event, or `None` once the stream has closed.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Stop claiming new URLs. Scans already in flight still finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this session when fired.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the batch and return the aligned results, whether or not any
    /// events were read.
    pub async fn finish(self) -> Result<Vec<ScanResult>> {
        let Self { events, handle, .. } = self;
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ScanError::BatchFailed(e.to_string())),
        };
        drop(events);
        outcome
    }
}

fn failure_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let panic = err.into_panic();
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        warn!("Scan batch panicked with a non-string payload");
        "scan worker panicked".to_string()
    }
}
