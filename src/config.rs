//! Configuration types for takaneko-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration for [`Archiver`](crate::Archiver)
///
/// All fields have sensible defaults except `token`, which must be supplied
/// by the caller (the library does not acquire credentials, see
/// [`ExportConfig::validate`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Bearer credential for the authenticated API origin
    ///
    /// A bare token is accepted; the `Bearer ` scheme is prepended when
    /// missing.
    pub token: String,

    /// Authenticated API origin (default: `https://api.takanekofc.com/auth/`)
    #[serde(default = "default_api_base")]
    pub api_base: Url,

    /// Origin that relative media references are resolved against
    /// (default: `https://takanekofc.com/`)
    #[serde(default = "default_media_base")]
    pub media_base: Url,

    /// Root directory for exported content (default: `./exported`)
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Items processed concurrently per chunk in stages 2 and 3 (default: 5)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Per-request timeout for detail fetches (default: 15s)
    ///
    /// A timed-out detail request is aborted and treated as a recoverable
    /// per-item failure, not a fatal one.
    #[serde(default = "default_detail_timeout")]
    pub detail_timeout: Duration,

    /// Timeout for the count and list requests (default: 30s)
    ///
    /// List-stage timeouts are fatal: without the full list there is nothing
    /// to archive.
    #[serde(default = "default_list_timeout")]
    pub list_timeout: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
            media_base: default_media_base(),
            export_dir: default_export_dir(),
            chunk_size: default_chunk_size(),
            detail_timeout: default_detail_timeout(),
            list_timeout: default_list_timeout(),
        }
    }
}

impl ExportConfig {
    /// Validate the configuration
    ///
    /// Returns a [`Error::Config`] naming the offending key when the token is
    /// empty or the chunk size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::Config {
                message: "token must not be empty".to_string(),
                key: Some("token".to_string()),
            });
        }
        if self.chunk_size == 0 {
            return Err(Error::Config {
                message: "chunk_size must be at least 1".to_string(),
                key: Some("chunk_size".to_string()),
            });
        }
        Ok(())
    }

    /// The bearer credential with the `Bearer ` scheme guaranteed present
    pub(crate) fn bearer_token(&self) -> String {
        let token = self.token.trim();
        if token.starts_with("Bearer ") {
            token.to_string()
        } else {
            format!("Bearer {}", token)
        }
    }
}

fn default_api_base() -> Url {
    // Static known-good URL; parse cannot fail
    #[allow(clippy::expect_used)]
    Url::parse("https://api.takanekofc.com/auth/").expect("valid static URL")
}

fn default_media_base() -> Url {
    #[allow(clippy::expect_used)]
    Url::parse("https://takanekofc.com/").expect("valid static URL")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("./exported")
}

fn default_chunk_size() -> usize {
    5
}

fn default_detail_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_list_timeout() -> Duration {
    Duration::from_secs(30)
}
