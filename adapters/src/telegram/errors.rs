use thiserror::Error;

use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The bot credential was refused. Retrying will not help until the
    /// configuration is fixed.
    #[error("notifier credential rejected (status {status})")]
    InvalidCredentials { status: u16 },

    #[error("message rejected: {description}")]
    Rejected { description: String },

    #[error("delivery failed: {0}")]
    Http(HttpError),
}

impl NotifyError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, NotifyError::InvalidCredentials { .. })
    }
}

impl From<HttpError> for NotifyError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized { status, .. } => NotifyError::InvalidCredentials { status },
            // The Bot API answers 404 for an unknown token.
            HttpError::Status { status: 404, .. } => {
                NotifyError::InvalidCredentials { status: 404 }
            }
            HttpError::Status { status: 400, body } => NotifyError::Rejected { description: body },
            other => NotifyError::Http(other),
        }
    }
}
