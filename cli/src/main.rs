mod config;
mod health;
mod keepalive;

use std::sync::Arc;

use adapters::{BinanceClient, RetryClient, TelegramNotifier};
use anyhow::Context;
use clap::Parser;
use common::logger::init_logger;
use scheduler::{ScanCounters, ScanCycle, Scheduler};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let production = std::env::var("APP_ENV").is_ok_and(|v| v == "production");
    init_logger("volscan", production);

    let cfg = Cli::parse().into_config().context("invalid configuration")?;
    info!(
        multiplier = cfg.scan.multiplier,
        near_miss_threshold = cfg.scan.near_miss_threshold,
        intervals = ?cfg.scan.intervals,
        quote_asset = %cfg.scan.quote_asset,
        max_instruments = ?cfg.scan.max_instruments,
        schedule = %cfg.scheduler.policy.describe(),
        telegram = ?cfg.telegram,
        "configuration loaded"
    );

    let http = RetryClient::new(cfg.retry.clone())?;
    let scan = Arc::new(cfg.scan);

    let market = Arc::new(BinanceClient::new(
        http.clone(),
        &scan.base_url,
        scan.request_timeout,
    ));
    let notifier = Arc::new(TelegramNotifier::new(http, cfg.telegram));
    let counters = ScanCounters::default();

    let cycle = ScanCycle::new(scan, market, notifier, counters.clone());
    let scheduler = Arc::new(Scheduler::new(cfg.scheduler, cycle));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener = TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .with_context(|| format!("bind liveness port {}", cfg.port))?;
    let health = tokio::spawn(health::serve(listener, shutdown_rx.clone()));

    let keepalive = match cfg.keepalive {
        Some(ka) => {
            let ping_http = RetryClient::new(keepalive::ping_policy())?;
            Some(tokio::spawn(keepalive::supervise(
                ping_http,
                ka,
                shutdown_rx.clone(),
            )))
        }
        None => None,
    };

    let scan_loop = tokio::spawn(Arc::clone(&scheduler).run(shutdown_rx));

    shutdown_signal().await;
    info!("shutdown requested; waiting for in-flight work");
    let _ = shutdown_tx.send(true);

    if let Err(e) = scan_loop.await {
        error!(error = %e, "scheduler task failed");
    }
    if let Some(ka) = keepalive {
        let _ = ka.await;
    }
    match health.await {
        Ok(Err(e)) => error!(error = %e, "liveness endpoint failed"),
        Err(e) => error!(error = %e, "liveness task failed"),
        Ok(Ok(())) => {}
    }

    info!(counters = ?counters.snapshot(), "volscan stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
