//! The trigger loop.
//!
//! Fires scan cycles according to the [`SchedulePolicy`]. At most one cycle
//! runs at a time: a trigger that arrives while a cycle is still running is
//! dropped and counted, never queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use adapters::{MarketDataApi, Notifier};
use common::time::now_ms;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument as _, debug, error, info, warn};

use crate::cycle::ScanCycle;
use crate::metrics::bump;
use crate::policy::SchedulePolicy;
use crate::state::BusyFlag;
use crate::types::{CycleReport, SchedulerConfig};

pub struct Scheduler<M: ?Sized, N: ?Sized> {
    cfg: SchedulerConfig,
    cycle: Arc<ScanCycle<M, N>>,
    busy: BusyFlag,
    next_cycle: AtomicU64,
}

impl<M, N> Scheduler<M, N>
where
    M: MarketDataApi + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    pub fn new(cfg: SchedulerConfig, cycle: ScanCycle<M, N>) -> Self {
        Self {
            cfg,
            cycle: Arc::new(cycle),
            busy: BusyFlag::new(),
            next_cycle: AtomicU64::new(1),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn cycle(&self) -> &ScanCycle<M, N> {
        &self.cycle
    }

    /// Starts a cycle in the background unless one is already running.
    ///
    /// Returns `None` when the trigger was dropped.
    pub fn trigger(self: &Arc<Self>, now_ms: i64) -> Option<JoinHandle<CycleReport>> {
        let Some(guard) = self.busy.try_acquire() else {
            bump(&self.cycle.counters().cycles_skipped_busy);
            warn!(skipped_busy = true, "previous scan cycle still running; trigger dropped");
            return None;
        };

        let n = self.next_cycle.fetch_add(1, Ordering::Relaxed);
        let cycle = Arc::clone(&self.cycle);
        debug!(cycle = n, "scan cycle triggered");

        let task = async move {
            let _busy = guard;
            cycle.run(n, now_ms).await
        };
        Some(tokio::spawn(task.in_current_span()))
    }

    /// Drives triggers until `shutdown` flips to `true` (or its sender is
    /// dropped), then waits for the in-flight cycle.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let schedule = self.cfg.policy.describe();
        info!(schedule = %schedule, run_on_start = self.cfg.run_on_start, "scheduler started");

        if self.cfg.announce_start {
            self.cycle.announce(&schedule, now_ms()).await;
        }

        let mut in_flight = None;
        if self.cfg.run_on_start {
            in_flight = self.trigger(now_ms());
        }

        match self.cfg.policy {
            SchedulePolicy::Fixed { every } => {
                let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    if *shutdown.borrow() {
                        break;
                    }
                    tokio::select! {
                        _ = ticker.tick() => {
                            if let Some(h) = self.trigger(now_ms()) {
                                in_flight = Some(h);
                            }
                        }
                        res = shutdown.changed() => {
                            if res.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
            SchedulePolicy::Aligned { .. } => {
                let mut last_fire = i64::MIN;

                loop {
                    if *shutdown.borrow() {
                        break;
                    }
                    let now = now_ms();
                    // Never fire the same boundary twice if the timer wakes early.
                    let fire_at = self.cfg.policy.next_fire_ms(now.max(last_fire));
                    let wait = Duration::from_millis((fire_at - now).max(0) as u64);
                    debug!(fire_at, wait_ms = wait.as_millis() as u64, "next scan cycle scheduled");

                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {
                            last_fire = fire_at;
                            if let Some(h) = self.trigger(now_ms()) {
                                in_flight = Some(h);
                            }
                        }
                        res = shutdown.changed() => {
                            if res.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("scheduler stopping");
        if let Some(handle) = in_flight {
            if !handle.is_finished() {
                info!("waiting for in-flight scan cycle");
            }
            if let Err(e) = handle.await {
                error!(error = %e, "scan cycle task failed");
            }
        }
    }
}
