use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::i18n::Language;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_BASE_URL is not a valid URL ({value}): {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("SITE_LANGUAGE must be one of en, ar, fr (got {0})")]
    UnknownLanguage(String),
    #[error("API_TIMEOUT_SECS must be a positive integer (got {0})")]
    InvalidTimeout(String),
}

/// Runtime settings, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub language: Language,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base = read("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(base.trim_end_matches('/'))
            .map_err(|source| ConfigError::InvalidBaseUrl {
                value: base.clone(),
                source,
            })?;

        let language = match read("SITE_LANGUAGE") {
            Some(code) => Language::from_code(&code).ok_or(ConfigError::UnknownLanguage(code))?,
            None => Language::default(),
        };

        let timeout = match read("API_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(30),
        };

        Ok(Self {
            api_base_url,
            api_token: read("API_TOKEN"),
            language,
            timeout,
        })
    }
}
