//! Helpers for filesystem naming and timestamp formatting.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// Placeholder used when a record carries no title
const UNTITLED: &str = "untitled";

/// Characters that cannot appear in a directory or file name component
const FORBIDDEN_PATH_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Fixed display timezone (JST, UTC+9)
fn jst() -> FixedOffset {
    // Static known-good offset; construction cannot fail
    #[allow(clippy::expect_used)]
    FixedOffset::east_opt(9 * 3600).expect("valid fixed offset")
}

fn to_jst(timestamp_ms: i64) -> Option<DateTime<FixedOffset>> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.with_timezone(&jst()))
}

/// Raw trimmed title for display, or the placeholder when absent or empty
pub fn display_title(title: Option<&str>) -> &str {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => UNTITLED,
    }
}

/// Replace forbidden path characters in a title with `_`
///
/// Empty (or absent) titles become a literal placeholder so the post
/// directory name stays well-formed.
pub fn sanitize_title(title: Option<&str>) -> String {
    let title = title.unwrap_or("").trim();
    if title.is_empty() {
        return UNTITLED.to_string();
    }
    title
        .chars()
        .map(|c| {
            if FORBIDDEN_PATH_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Format a release timestamp for use in directory and file names
///
/// `YYYY-MM-DD_HHMMSS` in JST. A missing or unrepresentable timestamp falls
/// back to the current time so the post still gets a stable-enough name.
pub fn file_timestamp(timestamp_ms: Option<i64>) -> String {
    let dt = timestamp_ms
        .and_then(to_jst)
        .unwrap_or_else(|| Utc::now().with_timezone(&jst()));
    dt.format("%Y-%m-%d_%H%M%S").to_string()
}

/// Format a release timestamp for display inside the document
///
/// JST, human-readable. Empty string when the timestamp is absent.
pub fn display_timestamp(timestamp_ms: Option<i64>) -> String {
    match timestamp_ms.and_then(to_jst) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Derive a media file extension from a URL's final path segment
///
/// Query strings and fragments are ignored; URLs whose last segment has no
/// extension default to `.jpg`.
pub fn media_extension(url: &str) -> String {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string(),
        // Relative or malformed reference: strip query/fragment by hand
        Err(_) => {
            let trimmed = url.split(['?', '#']).next().unwrap_or("");
            trimmed.rsplit('/').next().unwrap_or("").to_string()
        }
    };

    match segment.rfind('.') {
        Some(idx) if idx > 0 && idx < segment.len() - 1 => segment[idx..].to_string(),
        _ => ".jpg".to_string(),
    }
}

/// Media filename for the `n`-th (1-based) image of a post
///
/// `<fileTimestamp>_<NN><ext>` with the index zero-padded to two digits.
/// This numbering is what makes re-runs idempotent, so it must stay tied to
/// the (body images, then header images) URL order.
pub fn media_filename(file_ts: &str, index: usize, ext: &str) -> String {
    format!("{}_{:02}{}", file_ts, index, ext)
}
