#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use adapters::http::HttpError;
use adapters::{BinanceError, MarketDataApi};
use async_trait::async_trait;
use corelib::{Candle, Instrument, Interval};
use tokio::sync::Mutex;
use tokio::time::Instant;

// 2024-01-01T05:30:00Z
pub const NOW: i64 = 1_704_087_000_000;

#[derive(Clone)]
pub enum Reply {
    Candles(Vec<Candle>),
    Timeout,
}

#[derive(Default, Clone)]
pub struct MockMarket {
    pub catalog: Option<Vec<Instrument>>,
    pub replies: HashMap<(String, Interval), Reply>,
    pub calls: Arc<Mutex<Vec<(String, Interval, i64, Instant)>>>,
}

impl MockMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, instruments: Vec<Instrument>) -> Self {
        self.catalog = Some(instruments);
        self
    }

    pub fn with_reply(mut self, symbol: &str, interval: Interval, reply: Reply) -> Self {
        self.replies.insert((symbol.to_string(), interval), reply);
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
        end_time_ms: i64,
        _limit: u16,
    ) -> Result<Vec<Candle>, BinanceError> {
        self.calls
            .lock()
            .await
            .push((symbol.to_string(), interval, end_time_ms, Instant::now()));

        match self.replies.get(&(symbol.to_string(), interval)) {
            Some(Reply::Candles(c)) => Ok(c.clone()),
            Some(Reply::Timeout) | None => Err(BinanceError::Http(HttpError::Timeout)),
        }
    }
}

/// Two closed candles for `interval`, the later one closing at the last
/// completed bucket boundary before `NOW`.
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
