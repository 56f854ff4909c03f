//! Archiver facade and pipeline orchestration.
//!
//! The [`Archiver`] owns the HTTP client, the control handle, and the event
//! channel, and exposes the three pipeline stages both individually and as a
//! single [`run`](Archiver::run):
//! - `list` - stage 1, count + full list retrieval
//! - `details` - stage 2, bounded-concurrency detail retrieval
//! - `export` - stage 3, content export to disk
//! - `batching` - the chunked runner shared by stages 2 and 3

pub(crate) mod batching;
mod details;
mod export;
mod list;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::client::FeedClient;
use crate::config::ExportConfig;
use crate::control::ControlHandle;
use crate::error::Result;
use crate::types::Event;
use std::path::PathBuf;
use std::sync::Arc;

/// Feed archiver (cloneable - all fields are cheaply shared)
#[derive(Clone)]
pub struct Archiver {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<ExportConfig>,
    /// Feed API client
    pub(crate) client: FeedClient,
    /// Pause/cancel control plane, threaded into every stage
    control: ControlHandle,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl Archiver {
    /// Create a new archiver
    ///
    /// Validates the configuration and builds the HTTP client. No network
    /// traffic happens until a stage is invoked.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        let client = FeedClient::new(&config)?;

        // Buffered so slow subscribers don't stall the pipeline
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            config: Arc::new(config),
            client,
            control: ControlHandle::new(),
            event_tx,
        })
    }

    /// Subscribe to run events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. A subscriber lagging more than 1000 events behind
    /// receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// A clone of the control handle, for driving pause/cancel externally
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    /// Request that the current run pause at the next chunk boundary
    pub fn pause(&self) {
        self.control.pause();
    }

    /// Resume a paused run
    pub fn resume(&self) {
        self.control.resume();
    }

    /// Cancel the current run
    ///
    /// Observed cooperatively at the next chunk boundary; already-written
    /// files remain and a re-run picks up where this one left off.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Clear pause/cancel state between runs
    pub fn reset(&self) {
        self.control.reset();
    }

    pub(crate) fn control_ref(&self) -> &ControlHandle {
        &self.control
    }

    /// Emit an event to all subscribers
    ///
    /// Silently dropped when no one is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Run the full three-stage pipeline
    ///
    /// Resets control state, fetches the list, fetches details, exports
    /// content, and emits a terminal [`Event::Complete`], [`Event::Cancelled`]
    /// or [`Event::Failed`]. Returns the export root on success.
    ///
    /// Partial output from a failed or cancelled run is left intact and is
    /// safe to resume by re-running: documents are overwritten and media
    /// already on disk is never re-downloaded.
    pub async fn run(&self) -> Result<PathBuf> {
        self.control.reset();

        match self.run_pipeline().await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "archive run complete");
                self.emit_event(Event::Complete { path: path.clone() });
                Ok(path)
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!("archive run cancelled");
                self.emit_event(Event::Cancelled);
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "archive run failed");
                self.emit_event(Event::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self) -> Result<PathBuf> {
        let entries = self.fetch_list().await?;
        let records = self.fetch_details(entries).await?;
        self.export(records).await?;
        Ok(self.config.export_dir.clone())
    }
}
