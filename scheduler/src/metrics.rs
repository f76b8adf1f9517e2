use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct ScanCounters {
    pub cycles_started: Arc<AtomicU64>,
    pub cycles_completed: Arc<AtomicU64>,
    pub cycles_skipped_busy: Arc<AtomicU64>,

    pub catalog_failures: Arc<AtomicU64>,

    // per instrument x interval
    pub evaluations: Arc<AtomicU64>,
    pub eval_skips: Arc<AtomicU64>,
    pub eval_failures: Arc<AtomicU64>,

    pub alerts: Arc<AtomicU64>,
    pub near_misses: Arc<AtomicU64>,

    pub notify_failures: Arc<AtomicU64>,
    pub notify_auth_failures: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub cycles_started: u64,
    pub cycles_completed: u64,
    pub cycles_skipped_busy: u64,
    pub catalog_failures: u64,
    pub evaluations: u64,
    pub eval_skips: u64,
    pub eval_failures: u64,
    pub alerts: u64,
    pub near_misses: u64,
    pub notify_failures: u64,
    pub notify_auth_failures: u64,
}

pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn add(counter: &AtomicU64, n: usize) {
    counter.fetch_add(n as u64, Ordering::Relaxed);
}

impl ScanCounters {
    pub fn snapshot(&self) -> CounterSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CounterSnapshot {
            cycles_started: get(&self.cycles_started),
            cycles_completed: get(&self.cycles_completed),
            cycles_skipped_busy: get(&self.cycles_skipped_busy),
            catalog_failures: get(&self.catalog_failures),
            evaluations: get(&self.evaluations),
            eval_skips: get(&self.eval_skips),
            eval_failures: get(&self.eval_failures),
            alerts: get(&self.alerts),
            near_misses: get(&self.near_misses),
            notify_failures: get(&self.notify_failures),
            notify_auth_failures: get(&self.notify_auth_failures),
        }
    }
}
