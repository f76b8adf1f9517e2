use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one scan cycle.
pub fn cycle_span(cycle: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "scan_cycle",
        cycle,
        trace_id = %trace_id,
        instruments = field::Empty,
        alerts = field::Empty
    )
}

/// Child span for one instrument x interval evaluation.
pub fn child_span(name: &'static str, symbol: &str, interval: &str) -> Span {
    tracing::debug_span!("eval", name = %name, symbol = %symbol, interval = %interval)
}

pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
