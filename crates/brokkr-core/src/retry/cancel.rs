//! Cooperative cancellation for retry execution
//!
//! A `CancelToken` lets the caller stop a retry loop between attempts. The
//! executor never interrupts an in-flight attempt; it checks the token after
//! a failure and again after the backoff delay, and declines to schedule the
//! next attempt once cancellation is observed. The same token can be cloned
//! into the operation itself if the operation supports early exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for a retry loop
///
/// Cloning produces a handle to the same flag; cancelling any clone cancels
/// all of them.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, not-yet-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
