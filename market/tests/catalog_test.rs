mod support;

use corelib::Instrument;
use market::fetch_instruments;
use tracing_test::traced_test;

use support::MockMarket;

#[tokio::test]
async fn catalog_is_filtered_sorted_and_capped() {
    let api = MockMarket::new().with_catalog(vec![
        Instrument::new("SOLUSDT", "USDT", "TRADING"),
        Instrument::new("ETHBTC", "BTC", "TRADING"),
        Instrument::new("ADAUSDT", "USDT", "TRADING"),
        Instrument::new("OLDUSDT", "USDT", "BREAK"),
        Instrument::new("BNBUSDT", "USDT", "TRADING"),
    ]);

    let catalog = fetch_instruments(&api, "USDT", "TRADING", Some(2)).await;

    assert!(!catalog.unavailable);
    let symbols: Vec<&str> = catalog.instruments.iter().map(|i| i.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ADAUSDT", "BNBUSDT"]);
}

#[tokio::test]
#[traced_test]
async fn fetch_failure_yields_flagged_empty_catalog() {
    let api = MockMarket::new();

    let catalog = fetch_instruments(&api, "USDT", "TRADING", None).await;

    assert!(catalog.unavailable);
    assert!(catalog.is_empty());
    assert!(logs_contain("catalog_unavailable=true"));
}

#[tokio::test]
#[traced_test]
async fn empty_listing_is_not_a_failure() {
    let api = MockMarket::new().with_catalog(vec![]);

    let catalog = fetch_instruments(&api, "USDT", "TRADING", None).await;

    assert!(!catalog.unavailable);
    assert!(catalog.is_empty());
    assert!(!logs_contain("catalog_unavailable=true"));
}
