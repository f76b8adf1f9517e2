//! Process configuration: command-line flags, each backed by an
//! environment variable.

use std::time::Duration;

use adapters::{RetryPolicy, TelegramConfig};
use clap::{Parser, ValueEnum};
use corelib::{Interval, ParseIntervalError, ScanConfig, ScanConfigError};
use scheduler::{ScheduleError, SchedulePolicy, SchedulerConfig};
use thiserror::Error;

use crate::keepalive::KeepaliveConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScheduleKind {
    /// Fire at fixed wall-clock boundaries plus an offset.
    Aligned,
    /// Fire every period, counted from startup.
    Fixed,
}

#[derive(Debug, Parser)]
#[clap(name = "volscan", version, about = "Volume-spike scanner with Telegram digests")]
pub struct Cli {
    /// Telegram bot token
    #[clap(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    #[clap(long, env = "TG_TOKEN", hide = true, hide_env_values = true)]
    pub tg_token: Option<String>,

    /// Telegram chat receiving the digests
    #[clap(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    #[clap(long, env = "TG_CHAT_ID", hide = true)]
    pub tg_chat_id: Option<String>,

    #[clap(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub telegram_api: String,

    #[clap(long, env = "BINANCE_API_URL", default_value = "https://api.binance.com")]
    pub binance_api: String,

    /// Alert when current volume >= multiplier x previous volume
    #[clap(long, env = "VOLUME_MULTIPLIER", default_value_t = 5.0)]
    pub volume_multiplier: f64,

    /// Report ratios above this (and below the multiplier) as near misses
    #[clap(long, env = "NEAR_MISS_THRESHOLD", default_value_t = 3.0)]
    pub near_miss_threshold: f64,

    /// Max near misses listed in one digest
    #[clap(long, env = "NEAR_MISS_SAMPLE", default_value_t = 20)]
    pub near_miss_sample: usize,

    /// Candle intervals to scan (comma-separated)
    #[clap(long, env = "SCAN_INTERVALS", value_delimiter = ',', default_value = "4h,1d")]
    pub intervals: Vec<String>,

    #[clap(long, env = "QUOTE_ASSET", default_value = "USDT")]
    pub quote_asset: String,

    /// Cap on scanned instruments, 0 for none
    #[clap(long, env = "MAX_INSTRUMENTS", default_value_t = 0)]
    pub max_instruments: usize,

    /// Delay between candle requests
    #[clap(long, env = "PACING_MS", default_value_t = 250)]
    pub pacing_ms: u64,

    /// Max lag of the latest closed candle behind the expected close
    #[clap(long, env = "STALENESS_SECS", default_value_t = 900)]
    pub staleness_secs: u64,

    #[clap(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Total attempts per HTTP call, first try included
    #[clap(long, env = "HTTP_MAX_ATTEMPTS", default_value_t = 4)]
    pub max_attempts: u32,

    #[clap(long, env = "SCHEDULE", value_enum, default_value_t = ScheduleKind::Aligned)]
    pub schedule: ScheduleKind,

    #[clap(long, env = "CHECK_INTERVAL_MINUTES", default_value_t = 60)]
    pub check_interval_minutes: u64,

    /// Minutes past each aligned boundary
    #[clap(long, env = "SCHEDULE_OFFSET_MINUTES", default_value_t = 5)]
    pub offset_minutes: u64,

    #[clap(long, env = "RUN_ON_START")]
    pub run_on_start: bool,

    /// Liveness endpoint port
    #[clap(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Public URL pinged periodically to keep the host awake
    #[clap(long, env = "KEEPALIVE_URL")]
    pub keepalive_url: Option<String>,

    #[clap(long, env = "KEEPALIVE_MINUTES", default_value_t = 10)]
    pub keepalive_minutes: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing Telegram bot token (TELEGRAM_BOT_TOKEN)")]
    MissingToken,

    #[error("missing Telegram chat id (TELEGRAM_CHAT_ID)")]
    MissingChatId,

    #[error("invalid {name}: {value:?} is not an http(s) URL")]
    Url { name: &'static str, value: String },

    #[error("invalid interval list: {0}")]
    Interval(#[from] ParseIntervalError),

    #[error(transparent)]
    Scan(#[from] ScanConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub telegram: TelegramConfig,
    pub retry: RetryPolicy,
    pub scheduler: SchedulerConfig,
    pub port: u16,
    pub keepalive: Option<KeepaliveConfig>,
}

impl Cli {
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let token = non_empty(self.telegram_token.or(self.tg_token)).ok_or(ConfigError::MissingToken)?;
        let chat_id =
            non_empty(self.telegram_chat_id.or(self.tg_chat_id)).ok_or(ConfigError::MissingChatId)?;

        check_url("TELEGRAM_API_URL", &self.telegram_api)?;
        check_url("BINANCE_API_URL", &self.binance_api)?;

        let mut intervals = Vec::with_capacity(self.intervals.len());
        for label in self.intervals.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let interval: Interval = label.parse()?;
            if !intervals.contains(&interval) {
                intervals.push(interval);
            }
        }

        let request_timeout = Duration::from_secs(self.request_timeout_secs);

        let scan = ScanConfig {
            multiplier: self.volume_multiplier,
            near_miss_threshold: self.near_miss_threshold,
            near_miss_sample: self.near_miss_sample,
            intervals,
            quote_asset: self.quote_asset.trim().to_uppercase(),
            max_instruments: (self.max_instruments > 0).then_some(self.max_instruments),
            pacing: Duration::from_millis(self.pacing_ms),
            staleness_window: Duration::from_secs(self.staleness_secs),
            base_url: self.binance_api.trim_end_matches('/').to_string(),
            request_timeout,
            ..ScanConfig::default()
        };
        scan.validate()?;

        let period = Duration::from_secs(self.check_interval_minutes * 60);
        let policy = match self.schedule {
            ScheduleKind::Aligned => {
                SchedulePolicy::aligned(period, Duration::from_secs(self.offset_minutes * 60))?
            }
            ScheduleKind::Fixed => SchedulePolicy::fixed(period)?,
        };

        let keepalive = match non_empty(self.keepalive_url) {
            Some(url) => {
                check_url("KEEPALIVE_URL", &url)?;
                if self.keepalive_minutes == 0 {
                    return Err(ConfigError::Zero("KEEPALIVE_MINUTES"));
                }
                Some(KeepaliveConfig {
                    url,
                    every: Duration::from_secs(self.keepalive_minutes * 60),
                    timeout: request_timeout,
                    restart_delay: Duration::from_secs(5),
                })
            }
            None => None,
        };

        Ok(AppConfig {
            scan,
            telegram: TelegramConfig {
                api_base: self.telegram_api.trim_end_matches('/').to_string(),
                token,
                chat_id,
                timeout: request_timeout,
            },
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                ..RetryPolicy::default()
            },
            scheduler: SchedulerConfig {
                policy,
                run_on_start: self.run_on_start,
                announce_start: true,
            },
            port: self.port,
            keepalive,
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Url {
            name,
            value: value.to_string(),
        })
    }
}
