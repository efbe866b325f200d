//! Cooperative stop signal handed to every worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable cancellation flag. Starts cleared; once [`cancel`](Self::cancel) is
/// called it stays set for the lifetime of every clone.
///
/// Workers poll it between operations. Nothing is interrupted: an operation that
/// is already running finishes first.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
