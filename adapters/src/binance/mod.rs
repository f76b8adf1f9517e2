pub mod api;
pub mod client;
pub mod errors;
pub mod types;

pub use api::MarketDataApi;
pub use client::BinanceClient;
pub use errors::BinanceError;
