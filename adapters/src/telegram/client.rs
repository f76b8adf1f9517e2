use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};

use super::api::Notifier;
use super::errors::NotifyError;
use super::types::ApiResponse;
use crate::http::{HttpError, RetryClient};

/// Credentials and destination for the Telegram Bot API.
///
/// There are no defaults for `token` or `chat_id`; both come from the
/// deployment environment.
#[derive(Clone)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct TelegramNotifier {
    http: RetryClient,
    cfg: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(http: RetryClient, cfg: TelegramConfig) -> Self {
        Self { http, cfg }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.cfg.api_base.trim_end_matches('/'),
            self.cfg.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, message), fields(chat_id = %self.cfg.chat_id, len = message.len()))]
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let params = [
            ("chat_id", self.cfg.chat_id.as_str()),
            ("text", message),
            ("parse_mode", "HTML"),
            ("disable_web_page_preview", "true"),
        ];

        let resp = self
            .http
            .request(Method::POST, &self.send_message_url(), &params, self.cfg.timeout)
            .await?;

        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| NotifyError::Http(HttpError::Decode(e.without_url().to_string())))?;

        if !body.ok {
            return Err(NotifyError::Rejected {
                description: body.description.unwrap_or_default(),
            });
        }

        debug!("message delivered");
        Ok(())
    }
}
