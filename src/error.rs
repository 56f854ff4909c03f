//! Error types for takaneko-dl
//!
//! The taxonomy follows the pipeline's propagation policy:
//! - **Fatal** errors (list retrieval failures, [`Error::Cancelled`]) abort the
//!   run and cross stage boundaries.
//! - Recoverable per-item failures never surface here; they are contained at
//!   the item level inside the batch runner and reported as skips.

use thiserror::Error;

/// Result type alias for takaneko-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for takaneko-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "chunk_size")
        key: Option<String>,
    },

    /// Run cancelled by an external command
    ///
    /// Raised from `ControlHandle::checkpoint()` at the next chunk boundary
    /// after `cancel()` is issued. Files already written stand; consumers can
    /// distinguish this terminal cause via [`Error::is_cancelled`].
    #[error("cancelled by user")]
    Cancelled,

    /// Feed API error (unexpected status, malformed payload)
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Network or transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is the cooperative-cancellation terminal condition
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Feed API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Endpoint returned a non-success HTTP status
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// The endpoint that was called (e.g., "notifications/count")
        endpoint: String,
        /// The HTTP status code that was returned
        status: u16,
    },

    /// Response body could not be interpreted
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        /// The endpoint that was called
        endpoint: String,
        /// Why the body was rejected
        reason: String,
    },
}
