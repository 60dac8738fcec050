use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::parse_api_date;

pub const DEFAULT_ENDPOINT: &str =
    "https://developers.lotto.pl/api/open/v1/lotteries/draw-results/by-date-per-game";
pub const DEFAULT_USER_AGENT: &str = "rczajka.me";
pub const DEFAULT_OUTPUT_FILE: &str = "data.csv";
pub const DEFAULT_DELAY_MS: u64 = 1_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: String,
    pub user_agent: String,
    pub output_path: PathBuf,
    pub start_date: NaiveDate,
    pub request_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            start_date: epoch_start(),
            request_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// First day the archive is walked from when nothing else is configured.
pub fn epoch_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Reads the configuration from the process environment.
///
/// A `.env` file is expected to be loaded by the caller beforehand. A missing
/// `LOTTO_API_KEY` is not an error; the endpoint will reject the request.
pub fn load() -> Result<Config> {
    from_lookup(|name| env::var(name).ok())
}

pub(crate) fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let start_date = match lookup("LOTTO_START_DATE") {
        Some(value) => parse_api_date(&value)
            .with_context(|| format!("LOTTO_START_DATE is not a YYYY-MM-DD date: {value}"))?,
        None => defaults.start_date,
    };

    let request_delay = match lookup("LOTTO_REQUEST_DELAY_MS") {
        Some(value) => Duration::from_millis(
            value
                .parse()
                .with_context(|| format!("LOTTO_REQUEST_DELAY_MS is not an integer: {value}"))?,
        ),
        None => defaults.request_delay,
    };

    let request_timeout = match lookup("LOTTO_REQUEST_TIMEOUT_SECS") {
        Some(value) => Duration::from_secs(
            value
                .parse()
                .with_context(|| format!("LOTTO_REQUEST_TIMEOUT_SECS is not an integer: {value}"))?,
        ),
        None => defaults.request_timeout,
    };

    Ok(Config {
        api_key: lookup("LOTTO_API_KEY").unwrap_or_default(),
        endpoint: lookup("LOTTO_API_URL").unwrap_or(defaults.endpoint),
        user_agent: lookup("LOTTO_USER_AGENT").unwrap_or(defaults.user_agent),
        output_path: lookup("LOTTO_OUTPUT_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_path),
        start_date,
        request_delay,
        request_timeout,
    })
}
