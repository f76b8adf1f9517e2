//! Instrument catalog fetcher.
//!
//! One exchange-metadata request per cycle, filtered to the configured quote
//! asset and trading status, sorted by symbol and capped. A failed fetch
//! yields an empty catalog flagged `unavailable`, so a broken upstream is
//! never mistaken for a quiet market.

use std::time::Duration;

use adapters::MarketDataApi;
use common::logger::warn_if_slow;
use corelib::Instrument;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentCatalog {
    pub instruments: Vec<Instrument>,
    /// The upstream fetch failed; `instruments` is empty because of that.
    pub unavailable: bool,
}

impl InstrumentCatalog {
    pub fn unavailable() -> Self {
        Self {
            instruments: Vec::new(),
            unavailable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// Keeps instruments quoted in `quote_asset` with status `status_filter`,
/// sorted by symbol and truncated to `cap`.
pub fn filter_instruments(
    all: Vec<Instrument>,
    quote_asset: &str,
    status_filter: &str,
    cap: Option<usize>,
) -> Vec<Instrument> {
    let mut kept: Vec<Instrument> = all
        .into_iter()
        .filter(|i| i.quote_asset == quote_asset && i.status == status_filter)
        .collect();

    kept.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    kept.dedup_by(|a, b| a.symbol == b.symbol);

    if let Some(cap) = cap {
        kept.truncate(cap);
    }

    kept
}

pub async fn fetch_instruments<A>(
    api: &A,
    quote_asset: &str,
    status_filter: &str,
    cap: Option<usize>,
) -> InstrumentCatalog
where
    A: MarketDataApi + ?Sized,
{
    let listed = match warn_if_slow("catalog_fetch", Duration::from_secs(5), api.instruments()).await
    {
        Ok(all) => all,
        Err(e) => {
            warn!(
                catalog_unavailable = true,
                error = %e,
                "instrument catalog fetch failed; cycle continues with zero instruments"
            );
            return InstrumentCatalog::unavailable();
        }
    };

    let total = listed.len();
    let instruments = filter_instruments(listed, quote_asset, status_filter, cap);

    info!(
        listed = total,
        eligible = instruments.len(),
        quote_asset,
        cap = ?cap,
        "instrument catalog fetched"
    );

    InstrumentCatalog {
        instruments,
        unavailable: false,
    }
}
