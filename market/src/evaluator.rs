//! Interval ratio evaluator.
//!
//! Compares the two most recent *fully closed* candles of one instrument.
//! Candles are requested with `endTime` set to the close of the last
//! completed bucket, so the still-forming candle never takes part.
//!
//! Every failure mode ends here as "no ratio": defined skips are logged at
//! debug, upstream failures at warn. A scan cycle never aborts because of a
//! single instrument.

use std::sync::Arc;
use std::time::Duration;

use adapters::{BinanceError, MarketDataApi};
use common::logger::child_span;
use corelib::{Candle, Instrument, Interval, RatioResult, ScanConfig};
use tracing::{Instrument as _, debug, warn};

use crate::pacing::Pacer;

/// Candles requested per evaluation: previous and current.
pub const CANDLE_LIMIT: u16 = 2;

/// Defined conditions under which no ratio is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalSkip {
    /// Upstream returned fewer than two candles (new listing, empty history).
    TooFewCandles(usize),
    /// A returned candle had not closed yet.
    InProgressCandle { close_time_ms: i64 },
    /// Division guard: previous volume is zero, negative or not a number.
    NonPositivePreviousVolume(f64),
    /// Latest candle closed too long before the expected close time.
    Stale { lag_ms: i64 },
}

impl EvalSkip {
    /// Skips caused by the response not having the expected shape.
    pub fn is_data_shape(&self) -> bool {
        matches!(
            self,
            EvalSkip::TooFewCandles(_) | EvalSkip::InProgressCandle { .. }
        )
    }
}

#[derive(Debug)]
pub enum Evaluation {
    Ratio(RatioResult),
    Skipped(EvalSkip),
    Failed(BinanceError),
}

impl Evaluation {
    pub fn into_ratio(self) -> Option<RatioResult> {
        match self {
            Evaluation::Ratio(r) => Some(r),
            _ => None,
        }
    }
}

pub struct RatioEvaluator<A: ?Sized> {
    api: Arc<A>,
    pacer: Pacer,
    staleness_window: Duration,
}

impl<A> RatioEvaluator<A>
where
    A: MarketDataApi + ?Sized,
{
    pub fn new(api: Arc<A>, cfg: &ScanConfig) -> Self {
        Self {
            api,
            pacer: Pacer::new(cfg.pacing),
            staleness_window: cfg.staleness_window,
        }
    }

    /// Evaluates one instrument on one interval at wall-clock `now_ms`.
    ///
    /// Holds a pacing slot for the whole attempt, so the configured delay
    /// separates this request from the next one whatever the outcome.
    pub async fn evaluate(
        &self,
        instrument: &Instrument,
        interval: Interval,
        now_ms: i64,
    ) -> Evaluation {
        let _pace = self.pacer.acquire().await;

        let span = child_span("ratio", &instrument.symbol, interval.as_str());
        let outcome = self
            .fetch_and_compare(&instrument.symbol, interval, now_ms)
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(ratio)) => {
                debug!(
                    symbol = %ratio.symbol,
                    interval = %interval,
                    ratio = ratio.ratio,
                    "ratio computed"
                );
                Evaluation::Ratio(ratio)
            }
            Ok(Err(skip)) => {
                debug!(symbol = %instrument.symbol, interval = %interval, reason = ?skip, "evaluation skipped");
                Evaluation::Skipped(skip)
            }
            Err(e) => {
                warn!(symbol = %instrument.symbol, interval = %interval, error = %e, "candle fetch failed");
                Evaluation::Failed(e)
            }
        }
    }

    async fn fetch_and_compare(
        &self,
        symbol: &str,
        interval: Interval,
        now_ms: i64,
    ) -> Result<Result<RatioResult, EvalSkip>, BinanceError> {
        let expected_close = interval.last_closed_close_time(now_ms);
        let candles = self
            .api
            .candles(symbol, interval, expected_close, CANDLE_LIMIT)
            .await?;

        Ok(compare_closed(
            symbol,
            &candles,
            now_ms,
            expected_close,
            self.staleness_window,
        ))
    }
}

/// Pure part of the evaluation: checks the candle pair and computes the ratio.
pub fn compare_closed(
    symbol: &str,
    candles: &[Candle],
    now_ms: i64,
    expected_close_ms: i64,
    staleness_window: Duration,
) -> Result<RatioResult, EvalSkip> {
    let [.., previous, current] = candles else {
        return Err(EvalSkip::TooFewCandles(candles.len()));
    };

    if let Some(open) = [previous, current].into_iter().find(|c| c.is_open_at(now_ms)) {
        return Err(EvalSkip::InProgressCandle {
            close_time_ms: open.close_time_ms,
        });
    }

    let lag_ms = expected_close_ms - current.close_time_ms;
    if lag_ms > staleness_window.as_millis() as i64 {
        return Err(EvalSkip::Stale { lag_ms });
    }

    RatioResult::compute(symbol, previous, current)
        .ok_or(EvalSkip::NonPositivePreviousVolume(previous.volume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const H4: i64 = 4 * 60 * 60 * 1000;
    // 2024-01-01T05:30:00Z, inside the 04:00-08:00 bucket.
    const NOW: i64 = 1_704_087_000_000;

    fn expected_close() -> i64 {
        Interval::H4.last_closed_close_time(NOW)
    }

    /// Two consecutive closed 4h candles ending at `last_close`.
    fn pair(prev_volume: f64, curr_volume: f64, last_close: i64) -> Vec<Candle> {
        let curr_open = last_close + 1 - H4;
        vec![
            Candle {
                open_time_ms: curr_open - H4,
                close_time_ms: curr_open - 1,
                volume: prev_volume,
                close: 10.0,
                interval: Interval::H4,
            },
            Candle {
                open_time_ms: curr_open,
                close_time_ms: last_close,
                volume: curr_volume,
                close: 11.0,
                interval: Interval::H4,
            },
        ]
    }

    fn window() -> Duration {
        Duration::from_secs(15 * 60)
    }

    #[test]
    fn spike_ratio_is_computed() {
        let candles = pair(100.0, 600.0, expected_close());
        let r = compare_closed("AAABBB", &candles, NOW, expected_close(), window()).unwrap();

        assert_eq!(r.ratio, 6.0);
        assert_eq!(r.symbol, "AAABBB");
        assert_eq!(r.close_time_ms, expected_close());
        let pct = r.price_change_pct.unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_previous_volume_is_skipped() {
        let candles = pair(0.0, 600.0, expected_close());
        assert_eq!(
            compare_closed("X", &candles, NOW, expected_close(), window()),
            Err(EvalSkip::NonPositivePreviousVolume(0.0))
        );
    }

    #[test]
    fn single_candle_is_too_few() {
        let mut candles = pair(1.0, 2.0, expected_close());
        candles.remove(0);
        assert_eq!(
            compare_closed("X", &candles, NOW, expected_close(), window()),
            Err(EvalSkip::TooFewCandles(1))
        );
        assert!(EvalSkip::TooFewCandles(1).is_data_shape());
    }

    #[test]
    fn forming_candle_is_rejected() {
        // Pretend upstream ignored endTime and returned the current bucket.
        let candles = pair(1.0, 2.0, expected_close() + H4);
        assert!(matches!(
            compare_closed("X", &candles, NOW, expected_close(), window()),
            Err(EvalSkip::InProgressCandle { .. })
        ));
    }

    #[test]
    fn old_candles_are_stale() {
        // Last candle closed one full bucket before the expected close.
        let candles = pair(1.0, 50.0, expected_close() - H4);
        assert_eq!(
            compare_closed("X", &candles, NOW, expected_close(), window()),
            Err(EvalSkip::Stale { lag_ms: H4 })
        );
    }

    #[test]
    fn lag_within_window_is_accepted() {
        let candles = pair(1.0, 2.0, expected_close() - 60_000);
        assert!(compare_closed("X", &candles, NOW, expected_close(), window()).is_ok());
    }

    #[test]
    fn extra_candles_use_the_last_two() {
        let mut candles = pair(5.0, 10.0, expected_close());
        let mut older = candles[0].clone();
        older.volume = 0.0;
        older.close_time_ms -= H4;
        older.open_time_ms -= H4;
        candles.insert(0, older);

        let r = compare_closed("X", &candles, NOW, expected_close(), window()).unwrap();
        assert_eq!(r.ratio, 2.0);
    }

    proptest! {
        #[test]
        fn non_positive_previous_volume_never_produces_a_ratio(
            prev in prop_oneof![Just(0.0f64), -1.0e9f64..0.0, Just(-0.0f64)],
            curr in 0.0f64..1.0e9,
        ) {
            let candles = pair(prev, curr, expected_close());
            let out = compare_closed("X", &candles, NOW, expected_close(), window());
            prop_assert!(matches!(out, Err(EvalSkip::NonPositivePreviousVolume(_))));
        }
    }
}
