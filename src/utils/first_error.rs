//! Captures the first fatal error of a run and triggers cancellation.
//!
//! Per-file problems never land here. Only failures that must stop the whole
//! inventory (the output cannot be written, the user interrupted) are recorded,
//! and recording one cancels the shared token so workers stop taking files.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::error::InventoryError;

/// Write-once error slot tied to a cancellation token.
///
/// Thread-safe: the writer thread and the signal watcher may call `set()`
/// concurrently. Only the first error is kept.
pub struct FirstError {
    error: Mutex<Option<InventoryError>>,
    cancel: CancellationToken,
}

impl FirstError {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            error: Mutex::new(None),
            cancel,
        }
    }

    /// Record an error and cancel the run.
    ///
    /// Returns `true` if this was the first error.
    pub fn set(&self, err: InventoryError) -> bool {
        let mut guard = self.error.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return false;
        }
        *guard = Some(err);
        self.cancel.cancel();
        true
    }

    /// Take the recorded error, if any.
    pub fn take(&self) -> Option<InventoryError> {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
