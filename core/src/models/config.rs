use std::time::Duration;

use thiserror::Error;

use super::instrument::STATUS_TRADING;
use super::interval::Interval;

/// Scan parameters, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Alert when `ratio >= multiplier`.
    pub multiplier: f64,
    /// Near-miss when `near_miss_threshold < ratio < multiplier`.
    pub near_miss_threshold: f64,
    /// Max near-miss entries rendered in one digest.
    pub near_miss_sample: usize,
    pub intervals: Vec<Interval>,
    pub quote_asset: String,
    pub status_filter: String,
    /// `None` scans the whole filtered catalog.
    pub max_instruments: Option<usize>,
    /// Minimum gap between consecutive candle requests.
    pub pacing: Duration,
    /// Allowed lag of the latest closed candle behind the expected close time.
    pub staleness_window: Duration,
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScanConfigError {
    #[error("volume multiplier must be a finite number > 1, got {0}")]
    Multiplier(f64),

    #[error("near-miss threshold must be >= 1 and below the multiplier {multiplier}, got {threshold}")]
    NearMissThreshold { threshold: f64, multiplier: f64 },

    #[error("at least one interval is required")]
    NoIntervals,

    #[error("quote asset must not be empty")]
    EmptyQuoteAsset,

    #[error("request timeout must be non-zero")]
    ZeroTimeout,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            multiplier: 5.0,
            near_miss_threshold: 3.0,
            near_miss_sample: 20,
            intervals: vec![Interval::H4, Interval::D1],
            quote_asset: "USDT".to_string(),
            status_filter: STATUS_TRADING.to_string(),
            max_instruments: None,
            pacing: Duration::from_millis(250),
            staleness_window: Duration::from_secs(15 * 60),
            base_url: "https://api.binance.com".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ScanConfigError> {
        if !self.multiplier.is_finite() || self.multiplier <= 1.0 {
            return Err(ScanConfigError::Multiplier(self.multiplier));
        }

        if !self.near_miss_threshold.is_finite()
            || self.near_miss_threshold < 1.0
            || self.near_miss_threshold >= self.multiplier
        {
            return Err(ScanConfigError::NearMissThreshold {
                threshold: self.near_miss_threshold,
                multiplier: self.multiplier,
            });
        }

        if self.intervals.is_empty() {
            return Err(ScanConfigError::NoIntervals);
        }

        if self.quote_asset.trim().is_empty() {
            return Err(ScanConfigError::EmptyQuoteAsset);
        }

        if self.request_timeout.is_zero() {
            return Err(ScanConfigError::ZeroTimeout);
        }

        Ok(())
    }
}
