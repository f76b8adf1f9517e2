pub mod cycle;
pub mod engine;
pub mod metrics;
pub mod policy;
pub mod state;
pub mod types;

pub use cycle::ScanCycle;
pub use engine::Scheduler;
pub use metrics::{CounterSnapshot, ScanCounters};
pub use policy::{ScheduleError, SchedulePolicy};
pub use state::{BusyFlag, BusyGuard};
pub use types::{CyclePhase, CycleReport, SchedulerConfig};
