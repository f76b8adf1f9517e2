pub mod binance;
pub mod http;
pub mod telegram;

pub use binance::{BinanceClient, BinanceError, MarketDataApi};
pub use http::{HttpError, RetryClient, RetryPolicy};
pub use telegram::{NotifyError, Notifier, TelegramConfig, TelegramNotifier};
