use std::cmp::Ordering;

use corelib::{AlertBatch, RatioResult, ScanConfig};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Alert,
    NearMiss,
    Discarded,
}

/// `ratio >= multiplier` is an alert (inclusive boundary);
/// `near_miss_threshold < ratio < multiplier` is a near miss.
pub fn classify(ratio: f64, multiplier: f64, near_miss_threshold: f64) -> Tier {
    if ratio >= multiplier {
        Tier::Alert
    } else if ratio > near_miss_threshold {
        Tier::NearMiss
    } else {
        Tier::Discarded
    }
}

/// Partitions one cycle's ratios into alert and near-miss tiers, each
/// ordered by descending ratio. Ties keep evaluation order.
pub fn aggregate(results: Vec<RatioResult>, cfg: &ScanConfig, scanned_at_ms: i64) -> AlertBatch {
    let evaluated = results.len();
    let mut alerts = Vec::new();
    let mut near_misses = Vec::new();

    for r in results {
        match classify(r.ratio, cfg.multiplier, cfg.near_miss_threshold) {
            Tier::Alert => alerts.push(r),
            Tier::NearMiss => near_misses.push(r),
            Tier::Discarded => {}
        }
    }

    alerts.sort_by(by_ratio_desc);
    near_misses.sort_by(by_ratio_desc);

    debug!(
        evaluated,
        alerts = alerts.len(),
        near_misses = near_misses.len(),
        "results aggregated"
    );

    AlertBatch {
        scanned_at_ms,
        alerts,
        near_misses,
        evaluated,
        catalog_unavailable: false,
    }
}

fn by_ratio_desc(a: &RatioResult, b: &RatioResult) -> Ordering {
    b.ratio.partial_cmp(&a.ratio).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Candle, Interval};
    use proptest::prelude::*;

    fn result(symbol: &str, ratio: f64) -> RatioResult {
        let candle = |volume| Candle {
            open_time_ms: 0,
            close_time_ms: 1,
            volume,
            close: 1.0,
            interval: Interval::H4,
        };
        RatioResult::compute(symbol, &candle(100.0), &candle(100.0 * ratio)).unwrap()
    }

    fn cfg() -> ScanConfig {
        ScanConfig {
            multiplier: 5.0,
            near_miss_threshold: 3.0,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn ratio_equal_to_multiplier_is_an_alert() {
        assert_eq!(classify(5.0, 5.0, 3.0), Tier::Alert);
    }

    #[test]
    fn ratio_equal_to_secondary_threshold_is_discarded() {
        assert_eq!(classify(3.0, 5.0, 3.0), Tier::Discarded);
    }

    #[test]
    fn nan_is_discarded() {
        assert_eq!(classify(f64::NAN, 5.0, 3.0), Tier::Discarded);
    }

    #[test]
    fn tiers_are_disjoint_and_sorted() {
        let batch = aggregate(
            vec![
                result("A", 6.0),
                result("B", 4.0),
                result("C", 1.0),
                result("D", 9.0),
                result("E", 3.5),
            ],
            &cfg(),
            42,
        );

        let alerts: Vec<&str> = batch.alerts.iter().map(|r| r.symbol.as_str()).collect();
        let near: Vec<&str> = batch.near_misses.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(alerts, vec!["D", "A"]);
        assert_eq!(near, vec!["B", "E"]);
        assert_eq!(batch.evaluated, 5);
        assert_eq!(batch.scanned_at_ms, 42);
        assert!(!batch.catalog_unavailable);
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = aggregate(vec![], &cfg(), 7);
        assert!(!batch.has_alerts());
        assert!(batch.near_misses.is_empty());
        assert_eq!(batch.evaluated, 0);
    }

    proptest! {
        #[test]
        fn ratios_between_thresholds_are_near_misses(ratio in 3.0f64..5.0) {
            prop_assume!(ratio > 3.0);
            prop_assert_eq!(classify(ratio, 5.0, 3.0), Tier::NearMiss);
        }

        #[test]
        fn ratios_at_or_below_secondary_are_discarded(ratio in 0.0f64..=3.0) {
            prop_assert_eq!(classify(ratio, 5.0, 3.0), Tier::Discarded);
        }

        #[test]
        fn every_result_lands_in_at_most_one_tier(
            ratios in proptest::collection::vec(0.01f64..20.0, 0..50),
        ) {
            let results: Vec<RatioResult> = ratios
                .iter()
                .enumerate()
                .map(|(i, r)| result(&format!("S{i}"), *r))
                .collect();
            let batch = aggregate(results, &cfg(), 0);

            for a in &batch.alerts {
                prop_assert!(batch.near_misses.iter().all(|n| n.symbol != a.symbol));
                prop_assert!(a.ratio >= 5.0);
            }
            for n in &batch.near_misses {
                prop_assert!(n.ratio > 3.0 && n.ratio < 5.0);
            }
            prop_assert!(batch.alerts.len() + batch.near_misses.len() <= ratios.len());
        }
    }
}
