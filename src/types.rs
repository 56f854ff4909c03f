//! Core types for takaneko-dl

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Minimal reference to one feed item, used only to request its detail
///
/// The list endpoint returns richer objects; everything beyond the
/// reservation id is ignored here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    /// Identifier used to request the item's detail payload
    ///
    /// Entries without an id cannot be fetched and are skipped.
    #[serde(default)]
    pub notification_reservation_id: Option<String>,
}

/// Full content payload for one feed item
///
/// Immutable once fetched. The upstream payload carries an open-ended set of
/// `body`/`body2`/… and `image`/`image2`/… fields; those are collapsed into
/// explicit ordered lists at the deserialization boundary, preserving
/// ascending key order (which is what gives media files their stable
/// numbering).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "RawDetail")]
pub struct DetailRecord {
    /// Sender identifier; resolved to a display name at export time
    pub sender_id: String,
    /// Release timestamp in milliseconds since the epoch, if present
    pub release_date: Option<i64>,
    /// Item title, if present
    pub title: Option<String>,
    /// Rich-text body fields, in ascending `body*` key order
    pub bodies: Vec<String>,
    /// Relative media references, in ascending `image*` key order
    ///
    /// Resolved against the configured media origin and appended after all
    /// body images when media files are numbered.
    pub header_images: Vec<String>,
}

impl DetailRecord {
    /// Whether the payload carries a non-empty sender identifier
    ///
    /// Records without one are rejected by the detail fetcher.
    pub fn has_sender(&self) -> bool {
        !self.sender_id.trim().is_empty()
    }
}

/// Wire shape of the detail endpoint before field collapsing
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDetail {
    #[serde(default)]
    sending_official_user_id: Option<String>,
    #[serde(default)]
    release_date: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    // BTreeMap iteration order is ascending by key, matching the sorted
    // key scan the export layout depends on ("body" < "body2" < "body3").
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<RawDetail> for DetailRecord {
    fn from(raw: RawDetail) -> Self {
        let field_values = |prefix: &str| -> Vec<String> {
            raw.extra
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .filter_map(|(_, value)| value.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };

        Self {
            sender_id: raw.sending_official_user_id.unwrap_or_default(),
            release_date: raw.release_date,
            title: raw.title,
            bodies: field_values("body"),
            header_images: field_values("image"),
        }
    }
}

/// Pipeline stage, used to key progress reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Stage 1: count + full list retrieval
    FetchList,
    /// Stage 2: bounded-concurrency detail retrieval
    FetchDetails,
    /// Stage 3: content export to disk
    Export,
}

impl Stage {
    /// Stable string name for logging and progress keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchList => "fetch_list",
            Stage::FetchDetails => "fetch_details",
            Stage::Export => "export",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress snapshot emitted after each processed chunk
///
/// `percent` is non-decreasing within a stage and reaches exactly 100 on the
/// report following the final chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// The stage this report belongs to
    pub stage: Stage,
    /// Rounded completion percentage (0–100)
    pub percent: u8,
    /// Cumulative items processed so far (including skipped items)
    pub done: usize,
    /// Total items in the stage
    pub total: usize,
}

/// Event emitted during an archive run
///
/// Consumers subscribe via [`Archiver::subscribe`](crate::Archiver::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A pipeline stage began
    StageStarted {
        /// The stage that started
        stage: Stage,
    },

    /// Chunk-granularity progress update
    Progress {
        /// The progress snapshot
        #[serde(flatten)]
        report: ProgressReport,
    },

    /// A pipeline stage finished
    StageCompleted {
        /// The stage that completed
        stage: Stage,
    },

    /// The full run finished; exported content lives under `path`
    Complete {
        /// Root of the exported tree
        path: PathBuf,
    },

    /// The run was cancelled by an external command
    ///
    /// Partial output is left intact and safe to resume by re-running.
    Cancelled,

    /// The run failed for a reason other than cancellation
    Failed {
        /// Terminal error message
        message: String,
    },
}

/// Result of processing one item inside a batched stage
///
/// Per-item failures never abort a chunk; they become [`ItemOutcome::Skipped`]
/// so callers can report skip reasons in aggregate rather than only via logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome<T> {
    /// The item produced a value
    Done(T),
    /// The item was dropped, with the reason
    Skipped(SkipReason),
}

/// Why an item was dropped from a batched stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// List entry carried no reservation id
    MissingId,
    /// Detail payload carried no sender identifier
    MissingSender,
    /// Detail request failed (timeout, non-200, malformed body)
    FetchFailed,
    /// Export of the record failed partway; partial output may exist
    ExportFailed,
}

impl SkipReason {
    /// Stable string name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingId => "missing_id",
            SkipReason::MissingSender => "missing_sender",
            SkipReason::FetchFailed => "fetch_failed",
            SkipReason::ExportFailed => "export_failed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detail_record_collapses_prefixed_fields_in_key_order() {
        let json = serde_json::json!({
            "sendingOfficialUserId": "a4npPurePgMCD5wEmekQO",
            "releaseDate": 1700000000000i64,
            "title": "Hello",
            "body3": "<p>third</p>",
            "body": "<p>first</p>",
            "body2": "<p>second</p>",
            "image2": "uploads/b.png",
            "image": "uploads/a.jpg",
        });

        let record: DetailRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.sender_id, "a4npPurePgMCD5wEmekQO");
        assert_eq!(record.release_date, Some(1700000000000));
        assert_eq!(
            record.bodies,
            vec!["<p>first</p>", "<p>second</p>", "<p>third</p>"]
        );
        assert_eq!(record.header_images, vec!["uploads/a.jpg", "uploads/b.png"]);
    }

    #[test]
    fn detail_record_ignores_empty_and_non_string_fields() {
        let json = serde_json::json!({
            "sendingOfficialUserId": "x",
            "body": "",
            "body2": 42,
            "image": null,
        });

        let record: DetailRecord = serde_json::from_value(json).unwrap();
        assert!(record.bodies.is_empty());
        assert!(record.header_images.is_empty());
    }

    #[test]
    fn detail_record_without_sender_fails_validation() {
        let json = serde_json::json!({ "title": "orphan" });
        let record: DetailRecord = serde_json::from_value(json).unwrap();
        assert!(!record.has_sender());
    }

    #[test]
    fn list_entry_tolerates_missing_id() {
        let entry: ListEntry = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(entry.notification_reservation_id.is_none());
    }
}
