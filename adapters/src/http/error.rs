use thiserror::Error;

use super::retry::TRANSIENT_STATUSES;

const MAX_BODY_CHARS: usize = 512;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized (status {status})")]
    Unauthorized { status: u16, body: String },

    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<HttpError> },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("failed to build http client: {0}")]
    Client(String),
}

impl HttpError {
    /// Maps a transport-level failure. The URL is stripped since it may
    /// carry credentials in its path.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_decode() {
            HttpError::Decode(err.without_url().to_string())
        } else {
            HttpError::Network(err.without_url().to_string())
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        let body: String = body.chars().take(MAX_BODY_CHARS).collect();
        match status {
            401 | 403 => HttpError::Unauthorized { status, body },
            _ => HttpError::Status { status, body },
        }
    }

    /// Connection failures, timeouts and the transient status set.
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Timeout | HttpError::Network(_) => true,
            HttpError::Status { status, .. } => TRANSIENT_STATUSES.contains(status),
            _ => false,
        }
    }

    /// Status code of the final response, looking through `Exhausted`.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Unauthorized { status, .. } | HttpError::Status { status, .. } => {
                Some(*status)
            }
            HttpError::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HttpError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_set_is_retryable() {
        for status in [429, 500, 502, 503, 504] {
            assert!(HttpError::from_status(status, String::new()).is_transient());
        }
        assert!(HttpError::Timeout.is_transient());
        assert!(HttpError::Network("refused".into()).is_transient());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 404, 418, 501] {
            assert!(!HttpError::from_status(status, String::new()).is_transient());
        }
    }

    #[test]
    fn auth_statuses_are_distinguished() {
        assert!(HttpError::from_status(401, String::new()).is_unauthorized());
        assert!(HttpError::from_status(403, String::new()).is_unauthorized());
        assert!(!HttpError::from_status(404, String::new()).is_unauthorized());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let err = HttpError::from_status(500, "x".repeat(10_000));
        match err {
            HttpError::Status { body, .. } => assert_eq!(body.len(), MAX_BODY_CHARS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_looks_through_exhausted() {
        let err = HttpError::Exhausted {
            attempts: 3,
            last: Box::new(HttpError::from_status(503, String::new())),
        };
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_transient());
    }
}
