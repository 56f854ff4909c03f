//! Generic chunked batch runner shared by stages 2 and 3.
//!
//! Items are processed in fixed-size chunks: chunks strictly in sequence,
//! items within a chunk concurrently. The control plane is consulted before
//! every chunk and a progress report is emitted after every chunk.

use crate::control::ControlHandle;
use crate::error::Result;
use crate::types::{Event, ItemOutcome, ProgressReport, SkipReason, Stage};
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;

/// Pause between chunks so the host can service external control commands
///
/// A fairness requirement, not a correctness one.
const INTER_CHUNK_YIELD: Duration = Duration::from_millis(25);

/// What a batched stage produced
#[derive(Debug)]
pub(crate) struct BatchOutput<R> {
    /// Accepted per-item results, in input order (within each chunk)
    pub items: Vec<R>,
    /// Reasons for every item that was dropped
    pub skipped: Vec<SkipReason>,
}

/// Chunked execution driver for one stage
pub(crate) struct ChunkRunner<'a> {
    /// Stage name used for progress keys and log fields
    pub stage: Stage,
    /// Items processed concurrently per chunk
    pub chunk_size: usize,
    /// Control plane consulted before each chunk
    pub control: &'a ControlHandle,
    /// Progress sink
    pub events: &'a broadcast::Sender<Event>,
    /// Skip reason recorded when a transform returns `Err`
    pub failure_reason: SkipReason,
}

impl ChunkRunner<'_> {
    /// Process `items` in `ceil(N/chunk_size)` chunks
    ///
    /// A `Cancelled` checkpoint failure aborts the whole run and propagates;
    /// side effects from prior chunks stand. Per-item transform failures are
    /// logged and recorded as skips; they never abort the chunk.
    pub(crate) async fn run<T, R, F, Fut>(&self, items: Vec<T>, transform: F) -> Result<BatchOutput<R>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<ItemOutcome<R>>>,
    {
        let total = items.len();
        let mut output = BatchOutput {
            items: Vec::with_capacity(total),
            skipped: Vec::new(),
        };
        let mut done = 0usize;

        let mut remaining = items.into_iter().peekable();
        while remaining.peek().is_some() {
            self.control.checkpoint().await?;

            let chunk: Vec<T> = remaining.by_ref().take(self.chunk_size).collect();
            let results = futures::future::join_all(chunk.into_iter().map(&transform)).await;

            done += results.len();
            for result in results {
                match result {
                    Ok(ItemOutcome::Done(value)) => output.items.push(value),
                    Ok(ItemOutcome::Skipped(reason)) => {
                        tracing::debug!(stage = %self.stage, reason = reason.as_str(), "item skipped");
                        output.skipped.push(reason);
                    }
                    Err(e) => {
                        tracing::warn!(stage = %self.stage, error = %e, "item failed");
                        output.skipped.push(self.failure_reason);
                    }
                }
            }

            self.emit_progress(done, total);

            if remaining.peek().is_some() {
                tokio::time::sleep(INTER_CHUNK_YIELD).await;
            }
        }

        Ok(output)
    }

    fn emit_progress(&self, done: usize, total: usize) {
        let percent = percent_done(done, total);
        let report = ProgressReport {
            stage: self.stage,
            percent,
            done,
            total,
        };
        tracing::debug!(stage = %self.stage, done, total, percent, "chunk complete");
        // send() errors only when no one is subscribed, which is fine
        self.events.send(Event::Progress { report }).ok();
    }
}

/// Rounded completion percentage; monotonic because `done` is cumulative
fn percent_done(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}
