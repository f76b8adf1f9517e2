//! Digest rendering (Telegram HTML).
//!
//! A cycle always yields the alert digest first: either every alert on one
//! line each, or exactly one "no alerts" message. A near-miss digest follows
//! only when that tier is non-empty, truncated to `near_miss_sample` lines
//! with the true total stated.

use std::fmt::Write as _;

use common::time::format_ms;
use corelib::{AlertBatch, RatioResult, ScanConfig};

/// `SYMBOL interval: 6.0x (+5.00%)`
pub fn format_line(r: &RatioResult) -> String {
    let mut line = format!("{} {}: {:.1}x", escape_html(&r.symbol), r.interval, r.ratio);
    if let Some(pct) = r.price_change_pct {
        let _ = write!(line, " ({pct:+.2}%)");
    }
    line
}

pub fn render(batch: &AlertBatch, cfg: &ScanConfig) -> Vec<String> {
    let mut out = Vec::with_capacity(2);

    out.push(if batch.has_alerts() {
        render_alerts(batch, cfg)
    } else {
        render_no_alerts(batch, cfg)
    });

    if !batch.near_misses.is_empty() {
        out.push(render_near_misses(batch, cfg));
    }

    out
}

fn render_alerts(batch: &AlertBatch, cfg: &ScanConfig) -> String {
    let mut msg = format!(
        "<b>📈 Volume spikes ≥ {:.1}x ({})</b>\n",
        cfg.multiplier,
        format_ms(batch.scanned_at_ms)
    );
    for r in &batch.alerts {
        msg.push_str(&format_line(r));
        msg.push('\n');
    }
    let _ = write!(
        msg,
        "{} alert(s) out of {} evaluated pairs.",
        batch.alerts.len(),
        batch.evaluated
    );
    msg
}

fn render_no_alerts(batch: &AlertBatch, cfg: &ScanConfig) -> String {
    let mut msg = format!(
        "<b>No volume spikes ≥ {:.1}x this cycle ({})</b>\n",
        cfg.multiplier,
        format_ms(batch.scanned_at_ms)
    );
    if batch.catalog_unavailable {
        msg.push_str("⚠️ Instrument catalog unavailable; nothing was evaluated.");
    } else {
        let _ = write!(msg, "{} pairs evaluated.", batch.evaluated);
    }
    msg
}

fn render_near_misses(batch: &AlertBatch, cfg: &ScanConfig) -> String {
    let total = batch.near_misses.len();
    let shown = total.min(cfg.near_miss_sample);

    let mut msg = format!(
        "<b>🔎 Near misses ({:.1}x–{:.1}x): showing {} of {}</b>\n",
        cfg.near_miss_threshold, cfg.multiplier, shown, total
    );
    for r in batch.near_misses.iter().take(shown) {
        msg.push_str(&format_line(r));
        msg.push('\n');
    }
    let _ = write!(
        msg,
        "{} near miss(es) out of {} evaluated pairs.",
        total, batch.evaluated
    );
    msg
}

/// One-off notice sent when the scheduler starts.
pub fn render_startup(cfg: &ScanConfig, schedule: &str, now_ms: i64) -> String {
    let intervals: Vec<&str> = cfg.intervals.iter().map(|i| i.as_str()).collect();
    format!(
        "<b>🚀 Volume scanner started ({})</b>\nSpike ≥ {:.1}x, near miss > {:.1}x\nQuote {}, intervals {}\nSchedule: {}",
        format_ms(now_ms),
        cfg.multiplier,
        cfg.near_miss_threshold,
        escape_html(&cfg.quote_asset),
        intervals.join(", "),
        schedule
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}
