//! # takaneko-dl
//!
//! Backend library for archiving a fan-club message feed to disk.
//!
//! The pipeline runs in three batched stages: the message list is fetched,
//! full detail is retrieved per item under a concurrency cap, and each item
//! is materialized as a directory containing a markdown document and
//! deduplicated media files. A cooperative pause/cancel control plane spans
//! all three stages and progress is pushed to subscribers; re-runs are
//! idempotent at the media and document level.
//!
//! ## Quick Start
//!
//! ```no_run
//! use takaneko_dl::{Archiver, ExportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig {
//!         token: "Bearer ...".to_string(),
//!         export_dir: "./exported".into(),
//!         ..Default::default()
//!     };
//!
//!     let archiver = Archiver::new(config)?;
//!
//!     // Subscribe to progress events
//!     let mut events = archiver.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let exported = archiver.run().await?;
//!     println!("Exported to {}", exported.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archiver facade and pipeline stages
pub mod archiver;
/// Feed API HTTP client
pub mod client;
/// Configuration types
pub mod config;
/// Pause/cancel control plane
pub mod control;
/// Error types
pub mod error;
/// Rich-text markup transformer
pub mod markup;
/// Sender identifier → display name table
pub mod senders;
/// Core types and events
pub mod types;
/// Naming and timestamp helpers
pub mod utils;

// Re-export commonly used types
pub use archiver::Archiver;
pub use client::FeedClient;
pub use config::ExportConfig;
pub use control::ControlHandle;
pub use error::{ApiError, Error, Result};
pub use markup::MarkupContent;
pub use types::{
    DetailRecord, Event, ItemOutcome, ListEntry, ProgressReport, SkipReason, Stage,
};

/// Run a full archive pass with graceful signal handling.
///
/// Waits for a termination signal concurrently with the run and maps it to
/// the archiver's cooperative `cancel()`, so an interrupted run stops at the
/// next chunk boundary and leaves resumable output behind.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use takaneko_dl::{Archiver, ExportConfig, run_with_ctrlc};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ExportConfig {
///         token: "Bearer ...".to_string(),
///         ..Default::default()
///     };
///     let archiver = Archiver::new(config)?;
///
///     run_with_ctrlc(archiver).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_ctrlc(archiver: Archiver) -> Result<std::path::PathBuf> {
    let control = archiver.control();
    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        control.cancel();
    });

    let result = archiver.run().await;
    signal_task.abort();
    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments; ctrl_c covers SIGINT
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM, cancelling run"),
                _ = sigint.recv() => tracing::info!("received SIGINT, cancelling run"),
            }
        }
        _ => {
            tracing::warn!("signal registration failed, falling back to ctrl_c");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    } else {
        tracing::info!("received Ctrl+C, cancelling run");
    }
}
