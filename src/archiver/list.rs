//! Stage 1: list retrieval.

use crate::error::Result;
use crate::types::{Event, ListEntry, ProgressReport, Stage};

use super::Archiver;

impl Archiver {
    /// Fetch the full message list
    ///
    /// Two sequential requests: the count, then a single list request sized
    /// to it. Failures here are fatal; without the list there is nothing to
    /// archive. No batching, so the control plane is consulted once up front.
    pub async fn fetch_list(&self) -> Result<Vec<ListEntry>> {
        self.emit_event(Event::StageStarted {
            stage: Stage::FetchList,
        });
        self.control_ref().checkpoint().await?;

        let count = self.client.count().await?;
        tracing::info!(count, "message count fetched");

        let entries = self.client.list(count).await?;
        tracing::info!(entries = entries.len(), "message list fetched");

        self.emit_event(Event::Progress {
            report: ProgressReport {
                stage: Stage::FetchList,
                percent: 100,
                done: entries.len(),
                total: entries.len(),
            },
        });
        self.emit_event(Event::StageCompleted {
            stage: Stage::FetchList,
        });

        Ok(entries)
    }
}
