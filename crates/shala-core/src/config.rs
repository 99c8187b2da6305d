//! Client configuration.
//!
//! The backend base URL is configured once per process from the
//! `SHALA_API_BASE_URL` environment variable and falls back to a local
//! development server. Nothing here is persisted.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Url;

/// Environment variable holding the backend base URL
pub const BASE_URL_ENV: &str = "SHALA_API_BASE_URL";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "SHALA_REQUEST_TIMEOUT_SECS";

/// Base URL used when no override is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL without a trailing slash; request paths are appended verbatim.
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build a config for an explicit base URL with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(BASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim())?,
            _ => Self::default(),
        };

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", TIMEOUT_ENV))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).with_context(|| format!("Invalid API base URL: {}", raw))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("API base URL must use http or https: {}", raw);
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:4000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_override_strips_trailing_slash() {
        let config = Config::from_lookup(lookup(&[
            (BASE_URL_ENV, "https://api.example.com/v1/"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_base_url_falls_back() {
        let config = Config::from_lookup(lookup(&[(BASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::new("not a url").is_err());
        assert!(Config::new("ftp://files.example.com").is_err());
        assert!(Config::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).is_err());
    }
}
