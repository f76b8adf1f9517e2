#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use adapters::http::HttpError;
use adapters::{BinanceError, MarketDataApi, NotifyError, Notifier};
use async_trait::async_trait;
use corelib::{Candle, Instrument, Interval, ScanConfig};
use scheduler::{ScanCounters, ScanCycle};
use tokio::sync::{Mutex, Semaphore};

// 2024-01-01T05:30:00Z
pub const NOW: i64 = 1_704_087_000_000;

#[derive(Default, Clone)]
pub struct MockMarket {
    pub catalog: Option<Vec<Instrument>>,
    pub volumes: HashMap<(String, Interval), (f64, f64)>,
}

impl MockMarket {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn listing(symbols: &[&str]) -> Self {
        Self {
            catalog: Some(
                symbols
                    .iter()
                    .map(|s| Instrument::new(*s, "USDT", "TRADING"))
                    .collect(),
            ),
            volumes: HashMap::new(),
        }
    }

    pub fn with_volumes(mut self, symbol: &str, interval: Interval, prev: f64, curr: f64) -> Self {
        self.volumes.insert((symbol.to_string(), interval), (prev, curr));
        self
    }
}

#[async_trait]
impl MarketDataApi for MockMarket {
    async fn instruments(&self) -> Result<Vec<Instrument>, BinanceError> {
        self.catalog
            .clone()
            .ok_or(BinanceError::Http(HttpError::Network("connection refused".into())))
    }

    async fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        _end_time_ms: i64,
        _limit: u16,
    ) -> Result<Vec<Candle>, BinanceError> {
        match self.volumes.get(&(symbol.to_string(), interval)) {
            Some(&(prev, curr)) => Ok(closed_pair(interval, prev, curr)),
            None => Err(BinanceError::Http(HttpError::Timeout)),
        }
    }
}

/// Two closed candles ending at the last bucket boundary before `NOW`.
pub fn closed_pair(interval: Interval, prev_volume: f64, curr_volume: f64) -> Vec<Candle> {
    let d = interval.duration_ms();
    let curr_open = interval.bucket_start(NOW) - d;
    vec![
        Candle {
            open_time_ms: curr_open - d,
            close_time_ms: curr_open - 1,
            volume: prev_volume,
            close: 100.0,
            interval,
        },
        Candle {
            open_time_ms: curr_open,
            close_time_ms: curr_open + d - 1,
            volume: curr_volume,
            close: 105.0,
            interval,
        },
    ]
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    None,
    Auth,
    Transient,
}

#[derive(Clone)]
pub struct MockNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub attempts: Arc<Mutex<usize>>,
    pub fail: Arc<Mutex<FailMode>>,
    /// When set, each send waits for a permit.
    pub gate: Option<Arc<Semaphore>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(Mutex::new(0)),
            fail: Arc::new(Mutex::new(FailMode::None)),
            gate: None,
        }
    }

    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut n = Self::new();
        n.gate = Some(Arc::clone(&gate));
        (n, gate)
    }

    pub async fn set_fail(&self, mode: FailMode) {
        *self.fail.lock().await = mode;
    }

    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        *self.attempts.lock().await += 1;

        match *self.fail.lock().await {
            FailMode::None => {
                self.sent.lock().await.push(message.to_string());
                Ok(())
            }
            FailMode::Auth => Err(NotifyError::InvalidCredentials { status: 401 }),
            FailMode::Transient => Err(NotifyError::Http(HttpError::Timeout)),
        }
    }
}

pub fn scan_config() -> ScanConfig {
    ScanConfig {
        pacing: Duration::ZERO,
        ..ScanConfig::default()
    }
}

pub fn scan_cycle(
    market: MockMarket,
    notifier: MockNotifier,
) -> ScanCycle<MockMarket, MockNotifier> {
    ScanCycle::new(
        Arc::new(scan_config()),
        Arc::new(market),
        Arc::new(notifier),
        ScanCounters::default(),
    )
}
