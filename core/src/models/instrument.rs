use serde::{Deserialize, Serialize};

/// Exchange status string for instruments open for trading.
pub const STATUS_TRADING: &str = "TRADING";

/// A tradable instrument as listed by the exchange catalog.
///
/// Rebuilt on every scan cycle; nothing about an instrument is carried
/// from one cycle to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub quote_asset: String,
    pub status: String,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        quote_asset: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quote_asset: quote_asset.into(),
            status: status.into(),
        }
    }

    pub fn is_trading(&self) -> bool {
        self.status == STATUS_TRADING
    }
}
