//! Stage 2: bounded-concurrency detail retrieval.

use crate::error::Result;
use crate::types::{DetailRecord, Event, ItemOutcome, ListEntry, SkipReason, Stage};

use super::Archiver;
use super::batching::ChunkRunner;

impl Archiver {
    /// Fetch the detail payload for every list entry
    ///
    /// Entries are processed in chunks of `chunk_size`, each chunk's requests
    /// in flight concurrently. A response is accepted only on HTTP 200 with a
    /// non-empty sender identifier; anything else (timeout, non-200, missing
    /// identifier, malformed body) drops the entry with a logged warning.
    ///
    /// The output preserves input order and is at most as long as the input.
    pub async fn fetch_details(&self, entries: Vec<ListEntry>) -> Result<Vec<DetailRecord>> {
        let total = entries.len();
        tracing::info!(total, "fetching message details");
        self.emit_event(Event::StageStarted {
            stage: Stage::FetchDetails,
        });

        let runner = ChunkRunner {
            stage: Stage::FetchDetails,
            chunk_size: self.config.chunk_size,
            control: self.control_ref(),
            events: &self.event_tx,
            failure_reason: SkipReason::FetchFailed,
        };

        let output = runner
            .run(entries, |entry| self.fetch_one(entry))
            .await?;

        tracing::info!(
            accepted = output.items.len(),
            skipped = output.skipped.len(),
            total,
            "detail fetch complete"
        );
        self.emit_event(Event::StageCompleted {
            stage: Stage::FetchDetails,
        });

        Ok(output.items)
    }

    async fn fetch_one(&self, entry: ListEntry) -> Result<ItemOutcome<DetailRecord>> {
        // An empty id would hit the bare collection path, treat it as missing
        let id = match entry.notification_reservation_id {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(ItemOutcome::Skipped(SkipReason::MissingId)),
        };

        match self.client.detail(&id).await {
            Ok(record) if record.has_sender() => Ok(ItemOutcome::Done(record)),
            Ok(_) => {
                tracing::warn!(id, "detail payload has no sender identifier, dropping");
                Ok(ItemOutcome::Skipped(SkipReason::MissingSender))
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "detail fetch failed, dropping");
                Ok(ItemOutcome::Skipped(SkipReason::FetchFailed))
            }
        }
    }
}
