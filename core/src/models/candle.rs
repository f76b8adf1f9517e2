use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// One aggregated trading record for a single interval bucket.
///
/// Fetched fresh for every evaluation and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time_ms: i64,
    pub close_time_ms: i64,
    pub volume: f64,
    pub close: f64,
    pub interval: Interval,
}

impl Candle {
    /// True while the bucket is still forming at `now_ms`.
    pub fn is_open_at(&self, now_ms: i64) -> bool {
        self.close_time_ms >= now_ms
    }
}
