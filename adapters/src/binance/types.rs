use corelib::{Candle, Instrument, Interval};
use serde::Deserialize;
use serde_json::Value;

use super::errors::BinanceError;

#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub quote_asset: String,
}

impl From<SymbolInfo> for Instrument {
    fn from(s: SymbolInfo) -> Self {
        Instrument::new(s.symbol, s.quote_asset, s.status)
    }
}

// Positional kline layout:
// [open_time, open, high, low, close, volume, close_time, quote_volume, trades, ...]
const OPEN_TIME: usize = 0;
const CLOSE_PRICE: usize = 4;
const VOLUME: usize = 5;
const CLOSE_TIME: usize = 6;

/// Decodes one positional kline row.
pub fn parse_kline(row: &[Value], interval: Interval) -> Result<Candle, BinanceError> {
    Ok(Candle {
        open_time_ms: int_at(row, OPEN_TIME)?,
        close_time_ms: int_at(row, CLOSE_TIME)?,
        volume: decimal_at(row, VOLUME)?,
        close: decimal_at(row, CLOSE_PRICE)?,
        interval,
    })
}

fn field(row: &[Value], idx: usize) -> Result<&Value, BinanceError> {
    row.get(idx)
        .ok_or_else(|| BinanceError::Shape(format!("kline row has no field {idx}")))
}

fn int_at(row: &[Value], idx: usize) -> Result<i64, BinanceError> {
    field(row, idx)?
        .as_i64()
        .ok_or_else(|| BinanceError::Shape(format!("kline field {idx} is not an integer")))
}

// Prices and volumes arrive as decimal strings.
fn decimal_at(row: &[Value], idx: usize) -> Result<f64, BinanceError> {
    match field(row, idx)? {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| BinanceError::Shape(format!("kline field {idx}: {e}"))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| BinanceError::Shape(format!("kline field {idx} out of range"))),
        other => Err(BinanceError::Shape(format!(
            "kline field {idx} has unexpected type: {other}"
        ))),
    }
}
