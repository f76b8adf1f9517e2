use serde::Serialize;

use super::candle::Candle;
use super::interval::Interval;

/// Volume change between two consecutive closed candles of one instrument.
///
/// Only obtainable through [`RatioResult::compute`], which refuses a
/// non-positive previous volume, so `ratio` is always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct RatioResult {
    pub symbol: String,
    pub interval: Interval,
    pub previous_volume: f64,
    pub current_volume: f64,
    /// `current_volume / previous_volume`
    pub ratio: f64,
    /// Close-to-close change in percent; absent when the previous close is zero.
    pub price_change_pct: Option<f64>,
    pub close_time_ms: i64,
}

impl RatioResult {
    pub fn compute(symbol: &str, previous: &Candle, current: &Candle) -> Option<Self> {
        let usable = previous.volume.is_finite() && previous.volume > 0.0 && current.volume.is_finite();
        if !usable {
            return None;
        }

        let price_change_pct = (previous.close != 0.0 && previous.close.is_finite())
            .then(|| (current.close - previous.close) / previous.close * 100.0);

        Some(Self {
            symbol: symbol.to_string(),
            interval: current.interval,
            previous_volume: previous.volume,
            current_volume: current.volume,
            ratio: current.volume / previous.volume,
            price_change_pct,
            close_time_ms: current.close_time_ms,
        })
    }
}
