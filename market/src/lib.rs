pub mod catalog;
pub mod evaluator;
pub mod pacing;

pub use catalog::{InstrumentCatalog, fetch_instruments, filter_instruments};
pub use evaluator::{CANDLE_LIMIT, EvalSkip, Evaluation, RatioEvaluator};
pub use pacing::{PaceGuard, Pacer};
