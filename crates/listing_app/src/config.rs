//! Runtime configuration read once from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use engine_logging::LogDestination;
use listing_engine::{
    AggregatorSettings, DigestSettings, FetchSettings, TelegramSettings, WatcherSettings,
    TELEGRAM_API_URL,
};
use thiserror::Error;

const MAX_OFFSET_HOURS: i64 = 24;
const MAX_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramSettings,
    pub poll_interval: Duration,
    pub retry_delay: Duration,
    pub digest_hour: u32,
    pub data_file: PathBuf,
    pub date_offset_hours: i64,
    pub fetch_timeout: Duration,
    pub retention_days: Option<u32>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let chat_id = get("CHAT_ID").ok_or(ConfigError::Missing("CHAT_ID"))?;
        let mut telegram = TelegramSettings::new(bot_token, chat_id);
        if let Some(api_url) = get("TELEGRAM_API_URL") {
            telegram.api_url = api_url;
        }

        let digest_hour: u32 = parse_or(&get, "DAILY_DIGEST_HOUR", 8)?;
        if digest_hour > 23 {
            return Err(ConfigError::Invalid {
                key: "DAILY_DIGEST_HOUR",
                value: digest_hour.to_string(),
                reason: "hour must be between 0 and 23".to_string(),
            });
        }

        let date_offset_hours: i64 = parse_or(&get, "DATE_OFFSET_HOURS", 3)?;
        if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&date_offset_hours) {
            return Err(ConfigError::Invalid {
                key: "DATE_OFFSET_HOURS",
                value: date_offset_hours.to_string(),
                reason: format!("offset must be between -{MAX_OFFSET_HOURS} and {MAX_OFFSET_HOURS}"),
            });
        }

        let retention_days: Option<u32> = get("RETENTION_DAYS")
            .map(|value| parse_value("RETENTION_DAYS", value))
            .transpose()?;
        if let Some(days) = retention_days.filter(|days| *days > MAX_RETENTION_DAYS) {
            return Err(ConfigError::Invalid {
                key: "RETENTION_DAYS",
                value: days.to_string(),
                reason: format!("retention must not exceed {MAX_RETENTION_DAYS} days"),
            });
        }

        Ok(Self {
            telegram,
            poll_interval: Duration::from_secs(parse_or(&get, "CHECK_INTERVAL", 300)?),
            retry_delay: Duration::from_secs(parse_or(&get, "RETRY_DELAY", 60)?),
            digest_hour,
            data_file: get("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/sent_listings.json")),
            date_offset_hours,
            fetch_timeout: Duration::from_secs(parse_or(&get, "FETCH_TIMEOUT", 10)?),
            retention_days,
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::TerminalAndFile(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: self.fetch_timeout,
            request_timeout: self.fetch_timeout,
            ..FetchSettings::default()
        }
    }

    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            date_offset_hours: self.date_offset_hours,
            retention_days: self.retention_days,
        }
    }

    pub fn digest_settings(&self) -> DigestSettings {
        DigestSettings {
            digest_hour: self.digest_hour,
            date_offset_hours: self.date_offset_hours,
        }
    }

    pub fn watcher_settings(&self) -> WatcherSettings {
        WatcherSettings {
            poll_interval: self.poll_interval,
            retry_delay: self.retry_delay,
        }
    }

    pub fn uses_default_api(&self) -> bool {
        self.telegram.api_url == TELEGRAM_API_URL
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(value) => parse_value(key, value),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
        value,
    })
}
