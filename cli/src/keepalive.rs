//! Periodic self-ping that keeps free-tier hosts from idling the process.
//!
//! The ping loop exits after a run of consecutive failures and the
//! supervisor restarts it with exponential backoff. Nothing here touches
//! the scan cycle.

use std::time::Duration;

use adapters::http::Method;
use adapters::{HttpError, RetryClient, RetryPolicy};
use common::backoff::ExponentialBackoff;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Consecutive failed pings before the loop gives up and gets restarted.
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    pub url: String,
    pub every: Duration,
    pub timeout: Duration,
    /// First restart delay; doubles per restart up to five minutes.
    pub restart_delay: Duration,
}

pub async fn supervise(http: RetryClient, cfg: KeepaliveConfig, mut shutdown: watch::Receiver<bool>) {
    info!(every_secs = cfg.every.as_secs(), "keepalive started");
    let mut backoff = ExponentialBackoff::new(cfg.restart_delay, Duration::from_secs(300), 0.1);

    loop {
        let err = tokio::select! {
            err = ping_until_failure(&http, &cfg, &mut backoff) => err,
            _ = stopped(&mut shutdown) => break,
        };

        let delay = backoff.next_delay();
        warn!(
            error = %err,
            restart = backoff.attempt(),
            delay_ms = delay.as_millis() as u64,
            "keepalive loop exited; restarting"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stopped(&mut shutdown) => break,
        }
    }

    info!("keepalive stopped");
}

async fn ping_until_failure(
    http: &RetryClient,
    cfg: &KeepaliveConfig,
    backoff: &mut ExponentialBackoff,
) -> HttpError {
    let mut ticker = tokio::time::interval(cfg.every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures = 0;

    loop {
        ticker.tick().await;
        match http.request(Method::GET, &cfg.url, &[], cfg.timeout).await {
            Ok(resp) => {
                failures = 0;
                backoff.reset();
                debug!(status = resp.status().as_u16(), "keepalive ping ok");
            }
            Err(e) => {
                failures += 1;
                warn!(error = %e, failures, "keepalive ping failed");
                if failures >= MAX_CONSECUTIVE_FAILURES {
                    return e;
                }
            }
        }
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Pings never retry inside one tick; the next tick is the retry.
pub fn ping_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        ..RetryPolicy::default()
    }
}
