//! Stage 3: content export.
//!
//! Materializes each detail record as a post directory with a markdown
//! document and locally numbered media files, mirroring every media file
//! into the sender's flat `pictures` gallery.

use crate::error::Result;
use crate::markup;
use crate::senders::resolve_sender_name;
use crate::types::{DetailRecord, Event, ItemOutcome, SkipReason, Stage};
use crate::utils::{
    display_timestamp, display_title, file_timestamp, media_extension, media_filename,
    sanitize_title,
};
use std::path::Path;

use super::Archiver;
use super::batching::ChunkRunner;

/// Name of the flat per-sender media gallery directory
const GALLERY_DIR: &str = "pictures";

/// Name of the per-post document file
const DOCUMENT_FILE: &str = "index.md";

impl Archiver {
    /// Export all records to the configured export directory
    ///
    /// Records are processed in chunks of `chunk_size`. Per-record failures
    /// are contained: a record that cannot be exported is logged and skipped,
    /// and the run continues.
    pub async fn export(&self, records: Vec<DetailRecord>) -> Result<()> {
        let total = records.len();
        tracing::info!(total, path = %self.config.export_dir.display(), "exporting messages");

        tokio::fs::create_dir_all(&self.config.export_dir).await?;

        self.emit_event(Event::StageStarted {
            stage: Stage::Export,
        });

        let runner = ChunkRunner {
            stage: Stage::Export,
            chunk_size: self.config.chunk_size,
            control: self.control_ref(),
            events: &self.event_tx,
            failure_reason: SkipReason::ExportFailed,
        };

        let output = runner
            .run(records, |record| self.export_record(record))
            .await?;

        tracing::info!(
            exported = output.items.len(),
            skipped = output.skipped.len(),
            total,
            "export complete"
        );
        self.emit_event(Event::StageCompleted {
            stage: Stage::Export,
        });

        Ok(())
    }

    /// Export one record
    ///
    /// Errors propagated from here (directory creation, document write) are
    /// caught by the batch runner and recorded as a skip for this record.
    async fn export_record(&self, record: DetailRecord) -> Result<ItemOutcome<()>> {
        if !record.has_sender() {
            // Nothing to attribute the post to; silently skip
            return Ok(ItemOutcome::Skipped(SkipReason::MissingSender));
        }

        let sender = resolve_sender_name(&record.sender_id);
        let sender_dir = self.config.export_dir.join(&sender);
        let gallery_dir = sender_dir.join(GALLERY_DIR);

        let file_ts = file_timestamp(record.release_date);
        let dir_title = sanitize_title(record.title.as_deref());
        let post_dir = sender_dir.join(format!("{}_{}", file_ts, dir_title));

        tokio::fs::create_dir_all(&sender_dir).await?;
        tokio::fs::create_dir_all(&gallery_dir).await?;
        tokio::fs::create_dir_all(&post_dir).await?;

        // Body fields in key order: concatenated prose plus their images
        let mut prose = String::new();
        let mut image_urls = Vec::new();
        for body in &record.bodies {
            let content = markup::transform(body);
            prose.push_str(&content.prose);
            prose.push_str("\n\n");
            image_urls.extend(content.images);
        }

        // Header image fields follow all body images, resolved to absolute URLs
        for reference in &record.header_images {
            match self.client.resolve_media(reference) {
                Ok(url) => image_urls.push(url.to_string()),
                Err(e) => tracing::warn!(reference, error = %e, "unresolvable media reference"),
            }
        }

        let image_lines = self
            .download_media(&image_urls, &file_ts, &post_dir, &gallery_dir)
            .await;

        let title = display_title(record.title.as_deref());
        let document = format!(
            "# {}\n\n**Sender**: {}\n**Date**: {}\n\n---\n\n{}\n\n---\n\n{}",
            title,
            sender,
            display_timestamp(record.release_date),
            prose.trim_end(),
            image_lines,
        );
        tokio::fs::write(post_dir.join(DOCUMENT_FILE), document).await?;

        tracing::debug!(sender = %sender, post = %post_dir.display(), "post exported");
        Ok(ItemOutcome::Done(()))
    }

    /// Download every media URL sequentially, 1-based numbering in URL order
    ///
    /// A file already present in the post directory is never fetched again;
    /// a missing gallery copy is repaired from it. Individual download
    /// failures are logged and skipped, but the returned markdown still
    /// references the filename.
    async fn download_media(
        &self,
        urls: &[String],
        file_ts: &str,
        post_dir: &Path,
        gallery_dir: &Path,
    ) -> String {
        let mut image_lines = String::new();

        for (index, url) in urls.iter().enumerate() {
            let ext = media_extension(url);
            let filename = media_filename(file_ts, index + 1, &ext);
            let local_path = post_dir.join(&filename);
            let gallery_path = gallery_dir.join(&filename);

            if !local_path.exists() {
                if let Err(e) = self.store_media(url, &local_path, &gallery_path).await {
                    tracing::warn!(url, error = %e, "media download failed, skipping");
                }
            } else if !gallery_path.exists() {
                // Gallery repair is best-effort
                tokio::fs::copy(&local_path, &gallery_path).await.ok();
            }

            image_lines.push_str(&format!("![image]({})\n", filename));
        }

        image_lines
    }

    async fn store_media(&self, url: &str, local_path: &Path, gallery_path: &Path) -> Result<()> {
        let bytes = self.client.fetch_media(url).await?;
        tokio::fs::write(local_path, &bytes).await?;
        tokio::fs::write(gallery_path, &bytes).await?;
        Ok(())
    }
}
