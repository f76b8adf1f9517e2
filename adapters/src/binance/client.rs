use std::time::Duration;

use async_trait::async_trait;
use corelib::{Candle, Instrument, Interval};
use serde_json::Value;
use tracing::{debug, instrument};

use super::api::MarketDataApi;
use super::errors::BinanceError;
use super::types::{ExchangeInfo, parse_kline};
use crate::http::RetryClient;

const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
const KLINES_PATH: &str = "/api/v3/klines";

/// Binance spot REST adapter. All calls go through the shared retry client.
#[derive(Clone)]
pub struct BinanceClient {
    http: RetryClient,
    base_url: String,
    timeout: Duration,
}

impl BinanceClient {
    pub fn new(http: RetryClient, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl MarketDataApi for BinanceClient {
    #[instrument(skip(self), level = "debug")]
    async fn instruments(&self) -> Result<Vec<Instrument>, BinanceError> {
        let url = format!("{}{}", self.base_url, EXCHANGE_INFO_PATH);
        let info: ExchangeInfo = self.http.get_json(&url, &[], self.timeout).await?;

        debug!(symbols = info.symbols.len(), "exchange info fetched");

        Ok(info.symbols.into_iter().map(Instrument::from).collect())
    }

    #[instrument(skip(self), fields(interval = %interval), level = "debug")]
    async fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        end_time_ms: i64,
        limit: u16,
    ) -> Result<Vec<Candle>, BinanceError> {
        let url = format!("{}{}", self.base_url, KLINES_PATH);
        let end_time = end_time_ms.to_string();
        let limit = limit.to_string();
        let params = [
            ("symbol", symbol),
            ("interval", interval.as_str()),
            ("endTime", end_time.as_str()),
            ("limit", limit.as_str()),
        ];

        let rows: Vec<Vec<Value>> = self.http.get_json(&url, &params, self.timeout).await?;

        rows.iter().map(|row| parse_kline(row, interval)).collect()
    }
}
