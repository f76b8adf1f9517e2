//! Inter-request pacing.
//!
//! A [`PaceGuard`] is held for the duration of one upstream request. When it
//! drops, on success, error or early return alike, the next slot is pushed
//! `delay` into the future, and [`Pacer::acquire`] waits for that slot.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until the previous request's pacing delay has elapsed.
    pub async fn acquire(&self) -> PaceGuard<'_> {
        let slot = *self.next_slot.lock();
        if let Some(at) = slot {
            tokio::time::sleep_until(at).await;
        }
        PaceGuard { pacer: self }
    }
}

#[must_use = "pacing is applied when the guard drops"]
pub struct PaceGuard<'a> {
    pacer: &'a Pacer,
}

impl Drop for PaceGuard<'_> {
    fn drop(&mut self) {
        *self.pacer.next_slot.lock() = Some(Instant::now() + self.pacer.delay);
    }
}
