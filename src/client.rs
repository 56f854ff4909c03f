//! HTTP client for the authenticated feed API and media origin.

use crate::config::ExportConfig;
use crate::error::{ApiError, Error, Result};
use crate::types::{DetailRecord, ListEntry};
use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Client for the feed API
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    api_base: Url,
    media_base: Url,
    token: String,
    detail_timeout: std::time::Duration,
    list_timeout: std::time::Duration,
}

impl FeedClient {
    /// Build a client from the export configuration
    pub fn new(config: &ExportConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            media_base: config.media_base.clone(),
            token: config.bearer_token(),
            detail_timeout: config.detail_timeout,
            list_timeout: config.list_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base.join(path).map_err(|e| {
            Error::Api(ApiError::InvalidResponse {
                endpoint: path.to_string(),
                reason: format!("invalid endpoint URL: {}", e),
            })
        })
    }

    /// Total number of message-type notifications in the feed
    pub async fn count(&self) -> Result<u64> {
        let url = self.endpoint("notifications/count?notificationType=message")?;
        let response = self
            .http
            .get(url)
            .header("Authorization", &self.token)
            .timeout(self.list_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(ApiError::Status {
                endpoint: "notifications/count".to_string(),
                status: status.as_u16(),
            }));
        }

        let body: CountResponse = response.json().await.map_err(|e| {
            Error::Api(ApiError::InvalidResponse {
                endpoint: "notifications/count".to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(body.count)
    }

    /// The full message list, sized to the reported count
    ///
    /// Known limitation: this is a single unpaginated request. A server-side
    /// page cap would silently shorten the list rather than error.
    pub async fn list(&self, count: u64) -> Result<Vec<ListEntry>> {
        let path = format!(
            "notifications?notificationType=message&offset=0&limit={}&orderType=2&readType=all",
            count
        );
        let url = self.endpoint(&path)?;
        let response = self
            .http
            .get(url)
            .header("Authorization", &self.token)
            .timeout(self.list_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(ApiError::Status {
                endpoint: "notifications".to_string(),
                status: status.as_u16(),
            }));
        }

        let entries: Vec<ListEntry> = response.json().await.map_err(|e| {
            Error::Api(ApiError::InvalidResponse {
                endpoint: "notifications".to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(entries)
    }

    /// Detail payload for one feed item
    ///
    /// Applies the per-item timeout; the caller treats any error here as a
    /// recoverable per-item failure.
    pub async fn detail(&self, id: &str) -> Result<DetailRecord> {
        let url = self.endpoint(&format!("notifications/{}", id))?;
        let response = self
            .http
            .get(url)
            .header("Authorization", &self.token)
            .timeout(self.detail_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Api(ApiError::Status {
                endpoint: format!("notifications/{}", id),
                status: status.as_u16(),
            }));
        }

        let record: DetailRecord = response.json().await.map_err(|e| {
            Error::Api(ApiError::InvalidResponse {
                endpoint: format!("notifications/{}", id),
                reason: e.to_string(),
            })
        })?;
        Ok(record)
    }

    /// Resolve a relative media reference against the media origin
    pub fn resolve_media(&self, reference: &str) -> Result<Url> {
        self.media_base.join(reference).map_err(|e| {
            Error::Api(ApiError::InvalidResponse {
                endpoint: "media".to_string(),
                reason: format!("invalid media reference '{}': {}", reference, e),
            })
        })
    }

    /// Download one media resource as raw bytes
    pub async fn fetch_media(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Api(ApiError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            }));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
