//! One scan cycle: catalog, evaluation, aggregation, notification.
//!
//! A cycle never fails as a whole. Each phase degrades to "no result" and
//! the cycle always ends by handing at least one digest to the notifier.

use std::sync::Arc;
use std::time::Duration;

use adapters::{MarketDataApi, Notifier};
use alerts::{aggregate, render, render_startup};
use common::logger::{TraceId, cycle_span, warn_if_slow};
use corelib::{RatioResult, ScanConfig};
use market::{Evaluation, RatioEvaluator, fetch_instruments};
use tracing::{Instrument as _, error, info, warn};

use crate::metrics::{ScanCounters, add, bump};
use crate::types::{CyclePhase, CycleReport};

const SLOW_CYCLE: Duration = Duration::from_secs(15 * 60);

pub struct ScanCycle<M: ?Sized, N: ?Sized> {
    cfg: Arc<ScanConfig>,
    market: Arc<M>,
    evaluator: RatioEvaluator<M>,
    notifier: Arc<N>,
    counters: ScanCounters,
}

impl<M, N> ScanCycle<M, N>
where
    M: MarketDataApi + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        cfg: Arc<ScanConfig>,
        market: Arc<M>,
        notifier: Arc<N>,
        counters: ScanCounters,
    ) -> Self {
        let evaluator = RatioEvaluator::new(Arc::clone(&market), &cfg);
        Self {
            cfg,
            market,
            evaluator,
            notifier,
            counters,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.cfg
    }

    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    /// Runs cycle number `cycle` against wall-clock `now_ms`.
    pub async fn run(&self, cycle: u64, now_ms: i64) -> CycleReport {
        let trace_id = TraceId::new();
        let span = cycle_span(cycle, &trace_id);
        warn_if_slow("scan_cycle", SLOW_CYCLE, self.run_inner(cycle, now_ms))
            .instrument(span)
            .await
    }

    async fn run_inner(&self, cycle: u64, now_ms: i64) -> CycleReport {
        bump(&self.counters.cycles_started);

        let mut report = CycleReport {
            cycle,
            scanned_at_ms: now_ms,
            ..CycleReport::default()
        };
        let mut phase = CyclePhase::Idle;
        report.phases.push(phase);

        phase = phase.next();
        report.phases.push(phase);
        let catalog = fetch_instruments(
            self.market.as_ref(),
            &self.cfg.quote_asset,
            &self.cfg.status_filter,
            self.cfg.max_instruments,
        )
        .await;
        if catalog.unavailable {
            bump(&self.counters.catalog_failures);
        }
        report.instruments = catalog.len();
        report.catalog_unavailable = catalog.unavailable;
        tracing::Span::current().record("instruments", catalog.len());

        phase = phase.next();
        report.phases.push(phase);
        let mut results: Vec<RatioResult> = Vec::new();
        for instrument in &catalog.instruments {
            for &interval in &self.cfg.intervals {
                bump(&self.counters.evaluations);
                match self.evaluator.evaluate(instrument, interval, now_ms).await {
                    Evaluation::Ratio(r) => results.push(r),
                    Evaluation::Skipped(_) => {
                        bump(&self.counters.eval_skips);
                        report.skipped += 1;
                    }
                    Evaluation::Failed(_) => {
                        bump(&self.counters.eval_failures);
                        report.failed += 1;
                    }
                }
            }
        }

        phase = phase.next();
        report.phases.push(phase);
        let mut batch = aggregate(results, &self.cfg, now_ms);
        batch.catalog_unavailable = catalog.unavailable;
        report.evaluated = batch.evaluated;
        report.alerts = batch.alerts.len();
        report.near_misses = batch.near_misses.len();
        add(&self.counters.alerts, report.alerts);
        add(&self.counters.near_misses, report.near_misses);
        tracing::Span::current().record("alerts", report.alerts);
        if !batch.has_alerts() {
            info!(
                catalog_unavailable = batch.catalog_unavailable,
                evaluated = batch.evaluated,
                "no alerts this cycle"
            );
        }

        phase = phase.next();
        report.phases.push(phase);
        report.messages = render(&batch, &self.cfg);
        for msg in &report.messages {
            match self.notifier.send(msg).await {
                Ok(()) => report.delivered += 1,
                Err(e) if e.is_auth_failure() => {
                    bump(&self.counters.notify_auth_failures);
                    report.delivery_failed += report.messages.len() - report.delivered;
                    report.auth_failure = true;
                    error!(
                        auth_failure = true,
                        error = %e,
                        "notifier credential rejected; remaining digests dropped"
                    );
                    break;
                }
                Err(e) => {
                    bump(&self.counters.notify_failures);
                    report.delivery_failed += 1;
                    warn!(error = %e, "digest delivery failed");
                }
            }
        }

        phase = phase.next();
        report.phases.push(phase);
        bump(&self.counters.cycles_completed);

        info!(
            instruments = report.instruments,
            evaluated = report.evaluated,
            skipped = report.skipped,
            failed = report.failed,
            alerts = report.alerts,
            near_misses = report.near_misses,
            delivered = report.delivered,
            "scan cycle finished"
        );

        report
    }

    /// Sends the startup notice. Failure is logged and otherwise ignored.
    pub async fn announce(&self, schedule: &str, now_ms: i64) -> bool {
        let msg = render_startup(&self.cfg, schedule, now_ms);
        match self.notifier.send(&msg).await {
            Ok(()) => true,
            Err(e) => {
                if e.is_auth_failure() {
                    bump(&self.counters.notify_auth_failures);
                    error!(auth_failure = true, error = %e, "startup notice rejected");
                } else {
                    bump(&self.counters.notify_failures);
                    warn!(error = %e, "startup notice not delivered");
                }
                false
            }
        }
    }
}
