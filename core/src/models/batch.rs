use serde::Serialize;

use super::ratio::RatioResult;

/// Classified results of one scan cycle.
///
/// `alerts` and `near_misses` are disjoint; a result lands in at most one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertBatch {
    pub scanned_at_ms: i64,
    pub alerts: Vec<RatioResult>,
    pub near_misses: Vec<RatioResult>,
    /// Number of instrument x interval pairs that produced a ratio.
    pub evaluated: usize,
    /// Set when the instrument catalog could not be fetched this cycle.
    pub catalog_unavailable: bool,
}

impl AlertBatch {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}
