//! Shared types used by the scheduler subsystem.

use std::fmt;

use crate::policy::SchedulePolicy;

/// Scheduler knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub policy: SchedulePolicy,

    /// Fire one cycle immediately instead of waiting for the first trigger.
    pub run_on_start: bool,

    /// Send a "scanner started" message before the first trigger.
    pub announce_start: bool,
}

/// Phases of one scan cycle.
///
/// A cycle only moves to [`CyclePhase::next`]; failures inside a phase
/// degrade to "no result" and the cycle keeps advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    FetchingInstruments,
    Evaluating,
    Aggregating,
    Notifying,
}

impl CyclePhase {
    pub fn next(self) -> Self {
        match self {
            CyclePhase::Idle => CyclePhase::FetchingInstruments,
            CyclePhase::FetchingInstruments => CyclePhase::Evaluating,
            CyclePhase::Evaluating => CyclePhase::Aggregating,
            CyclePhase::Aggregating => CyclePhase::Notifying,
            CyclePhase::Notifying => CyclePhase::Idle,
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::FetchingInstruments => "fetching_instruments",
            CyclePhase::Evaluating => "evaluating",
            CyclePhase::Aggregating => "aggregating",
            CyclePhase::Notifying => "notifying",
        };
        f.write_str(s)
    }
}

/// Outcome of one scan cycle, for logs and tests.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub scanned_at_ms: i64,
    pub instruments: usize,
    pub catalog_unavailable: bool,
    pub evaluated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub alerts: usize,
    pub near_misses: usize,
    /// Digests handed to the notifier, in order.
    pub messages: Vec<String>,
    pub delivered: usize,
    pub delivery_failed: usize,
    pub auth_failure: bool,
    /// Every phase entered, starting and ending with `Idle`.
    pub phases: Vec<CyclePhase>,
}
