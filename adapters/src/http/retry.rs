//! Rate-limited retry client.
//!
//! Every outbound call of the scanner goes through [`RetryClient::request`]:
//! an explicit per-call timeout, retries on connection failures and on the
//! transient status set, exponential backoff between attempts, and a hard
//! bound on the number of attempts.

use std::time::Duration;

use common::backoff::ExponentialBackoff;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::HttpError;

/// Statuses worth another attempt.
pub const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter: 0.1,
        }
    }
}

#[derive(Clone)]
pub struct RetryClient {
    http: Client,
    policy: RetryPolicy,
}

impl RetryClient {
    pub fn new(policy: RetryPolicy) -> Result<Self, HttpError> {
        let http = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { http, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends one logical request, retrying transient failures.
    ///
    /// `params` go into the query string for `GET` and into a form body
    /// otherwise. Only 2xx responses are returned as `Ok`.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Response, HttpError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = ExponentialBackoff::new(
            self.policy.base_delay,
            self.policy.max_delay,
            self.policy.jitter,
        );
        let endpoint = redact(url);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match self.send_once(method.clone(), url, params, timeout).await {
                Ok(resp) => {
                    debug!(%endpoint, attempt, status = resp.status().as_u16(), "request ok");
                    return Ok(resp);
                }
                Err(e) => e,
            };

            if !err.is_transient() {
                debug!(%endpoint, attempt, error = %err, "non-retryable failure");
                return Err(err);
            }

            if attempt >= max_attempts {
                warn!(%endpoint, attempts = attempt, error = %err, "retries exhausted");
                return Err(HttpError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = backoff.next_delay();
            warn!(
                %endpoint,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient failure; backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// `GET` and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T, HttpError> {
        let resp = self.request(Method::GET, url, params, timeout).await?;
        resp.json::<T>()
            .await
            .map_err(|e| HttpError::Decode(e.without_url().to_string()))
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Response, HttpError> {
        let builder = self.http.request(method.clone(), url).timeout(timeout);
        let builder = if method == Method::GET {
            builder.query(params)
        } else {
            builder.form(params)
        };

        let resp = builder.send().await.map_err(HttpError::from_transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(HttpError::from_status(status.as_u16(), body))
    }
}

/// Drops the query string and masks `/bot<token>` path segments.
fn redact(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query
        .split('/')
        .map(|seg| {
            if seg.starts_with("bot") && seg.contains(':') {
                "bot***"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
