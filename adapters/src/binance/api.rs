use async_trait::async_trait;
use corelib::{Candle, Instrument, Interval};

use super::errors::BinanceError;

/// Read-only market data needed by a scan cycle.
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    /// Every instrument the exchange lists, unfiltered.
    async fn instruments(&self) -> Result<Vec<Instrument>, BinanceError>;

    /// Up to `limit` candles ending at or before `end_time_ms`, oldest first.
    async fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        end_time_ms: i64,
        limit: u16,
    ) -> Result<Vec<Candle>, BinanceError>;
}
