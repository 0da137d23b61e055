//! rolling::cancel — cooperative cancellation of a rolling run.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// CancellationToken — shared flag polled by the orchestrator.
///
/// Clones share the same flag, so a token handed to another thread (a UI,
/// a signal handler) can stop a run in progress. Cancellation is sticky.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
