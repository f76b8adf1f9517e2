pub mod batch;
pub mod candle;
pub mod config;
pub mod instrument;
pub mod interval;
pub mod ratio;

pub use batch::AlertBatch;
pub use candle::Candle;
pub use config::{ScanConfig, ScanConfigError};
pub use instrument::Instrument;
pub use interval::{Interval, ParseIntervalError};
pub use ratio::RatioResult;
