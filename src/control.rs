//! Run control plane: pause, resume, cancel, reset, checkpoint.
//!
//! One [`ControlHandle`] is threaded explicitly through every pipeline stage
//! (there is no process-wide singleton). Stages consult [`checkpoint`] before
//! each chunk of work; external operator commands flip the flags. Blocked
//! checkpoints are woken through a [`Notify`] rather than polling on a fixed
//! interval.
//!
//! [`checkpoint`]: ControlHandle::checkpoint

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Shared pause/cancel control handle
///
/// Cloning is cheap; all clones observe the same state. The two booleans are
/// the only cross-stage mutable shared state in the pipeline: written by
/// operator commands, read by stages at chunk boundaries.
#[derive(Clone, Default)]
pub struct ControlHandle {
    inner: Arc<ControlState>,
}

#[derive(Default)]
struct ControlState {
    paused: AtomicBool,
    cancelled: AtomicBool,
    wake: Notify,
}

impl ControlHandle {
    /// Create a new handle with both flags cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run pause at the next chunk boundary
    ///
    /// Idempotent; a no-op outside an active run. Chunks already dispatched
    /// run to completion.
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::Release);
        tracing::info!("export paused");
    }

    /// Resume a paused run
    ///
    /// Idempotent; a no-op when not paused.
    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::Release);
        self.inner.wake.notify_waiters();
        tracing::info!("export resumed");
    }

    /// Cancel the run
    ///
    /// Also clears `paused` so checkpoints parked in a pause can observe the
    /// cancellation and fail promptly. Already-written files remain on disk.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.paused.store(false, Ordering::Release);
        self.inner.wake.notify_waiters();
        tracing::info!("export cancelled");
    }

    /// Clear both flags
    ///
    /// The only operation permitted between runs; must never be called while
    /// a run is in flight.
    pub fn reset(&self) {
        self.inner.paused.store(false, Ordering::Release);
        self.inner.cancelled.store(false, Ordering::Release);
    }

    /// Whether a pause has been requested
    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Acquire)
    }

    /// Whether the run has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Consult the control plane before a unit of batched work
    ///
    /// Fails immediately with [`Error::Cancelled`] when cancelled. When
    /// paused, parks the calling stage until `resume()` or `cancel()` wakes
    /// it; other tasks keep running and the flags stay observable throughout.
    pub async fn checkpoint(&self) -> Result<()> {
        loop {
            // Register for wakeup before re-reading the flags so a command
            // landing between the check and the await is not missed.
            let notified = self.inner.wake.notified();

            if self.inner.cancelled.load(Ordering::Acquire) {
                return Err(Error::Cancelled);
            }
            if !self.inner.paused.load(Ordering::Acquire) {
                return Ok(());
            }

            notified.await;
        }
    }
}
