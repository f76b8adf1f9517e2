//! Non-overlap guard for scan cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a scan cycle is running.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    inner: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag, or returns `None` if a cycle already holds it.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.inner
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                inner: Arc::clone(&self.inner),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

/// Releases the flag on drop, including when the cycle task panics.
#[derive(Debug)]
pub struct BusyGuard {
    inner: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.store(false, Ordering::Release);
    }
}
