//! Runtime configuration read from environment variables.
//!
//! `Config::from_env` falls back to development defaults for anything unset and
//! only fails when a value is present but cannot be parsed.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::gdelt::client::{ClientSettings, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::gdelt::decoder::DEFAULT_MAX_TRIES;
use crate::gdelt::filters::DEFAULT_MAX_RECORDS;
use crate::ingest::IngestSettings;
use crate::ingest::breaker::DEFAULT_FAILURE_THRESHOLD;

pub const ENV_GDELT_BASE_URL: &str = "GDELT_BASE_URL";
pub const ENV_GDELT_USER_AGENT: &str = "GDELT_USER_AGENT";
pub const ENV_GDELT_DECODE_MAX_TRIES: &str = "GDELT_DECODE_MAX_TRIES";
pub const ENV_RATE_LIMIT_DELAY_MS: &str = "INGEST_RATE_LIMIT_DELAY_MS";
pub const ENV_MAX_CONSECUTIVE_FAILURES: &str = "INGEST_MAX_CONSECUTIVE_FAILURES";
pub const ENV_MAX_RECORDS: &str = "INGEST_MAX_RECORDS";
pub const ENV_LANGUAGES: &str = "INGEST_LANGUAGES";

const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 6_000;
const DEFAULT_LANGUAGES: &str = "english";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    gdelt_base_url: String,
    gdelt_user_agent: String,
    decode_max_tries: usize,
    rate_limit_delay_ms: u64,
    max_consecutive_failures: u32,
    max_records: u32,
    languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gdelt_base_url: DEFAULT_BASE_URL.to_string(),
            gdelt_user_agent: DEFAULT_USER_AGENT.to_string(),
            decode_max_tries: DEFAULT_MAX_TRIES,
            rate_limit_delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
            max_consecutive_failures: DEFAULT_FAILURE_THRESHOLD,
            max_records: DEFAULT_MAX_RECORDS,
            languages: split_list(DEFAULT_LANGUAGES),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            gdelt_base_url: env::var(ENV_GDELT_BASE_URL).unwrap_or(defaults.gdelt_base_url),
            gdelt_user_agent: env::var(ENV_GDELT_USER_AGENT).unwrap_or(defaults.gdelt_user_agent),
            decode_max_tries: parsed(ENV_GDELT_DECODE_MAX_TRIES, defaults.decode_max_tries)?,
            rate_limit_delay_ms: parsed(ENV_RATE_LIMIT_DELAY_MS, defaults.rate_limit_delay_ms)?,
            max_consecutive_failures: parsed(
                ENV_MAX_CONSECUTIVE_FAILURES,
                defaults.max_consecutive_failures,
            )?,
            max_records: parsed(ENV_MAX_RECORDS, defaults.max_records)?,
            languages: env::var(ENV_LANGUAGES)
                .map(|v| split_list(&v))
                .unwrap_or(defaults.languages),
        })
    }

    pub fn gdelt_base_url(&self) -> &str {
        &self.gdelt_base_url
    }

    pub fn gdelt_user_agent(&self) -> &str {
        &self.gdelt_user_agent
    }

    pub fn decode_max_tries(&self) -> usize {
        self.decode_max_tries
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures
    }

    pub fn max_records(&self) -> u32 {
        self.max_records
    }

    /// `sourcelang` filter values.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.gdelt_base_url.clone(),
            user_agent: self.gdelt_user_agent.clone(),
            decode_max_tries: self.decode_max_tries,
        }
    }

    pub fn ingest_settings(&self) -> IngestSettings {
        IngestSettings {
            rate_limit_delay: self.rate_limit_delay(),
            max_consecutive_failures: self.max_consecutive_failures,
            max_records: self.max_records,
            languages: self.languages.clone(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn parsed<T>(field: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(field) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field,
            reason: format!("{raw:?}: {e}"),
        }),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
