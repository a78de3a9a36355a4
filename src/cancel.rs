use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one request.
///
/// Raised by the controller when the request is superseded or the process is
/// shutting down. Observation is eventually-consistent: loads and stores use
/// relaxed ordering, so a worker may emit a match or two after the flag is
/// raised. Consumers that need a hard cut-off get it from the shutdown
/// tokens on the pipes, not from this flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    raised: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Idempotent; the flag is never lowered.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }
}
