use thiserror::Error;

use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum BinanceError {
    #[error("http error: {0}")]
    Http(#[from] HttpError),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}
