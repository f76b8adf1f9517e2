pub mod error;
pub mod retry;

pub use error::HttpError;
pub use retry::{RetryClient, RetryPolicy, TRANSIENT_STATUSES};

pub use reqwest::Method;
