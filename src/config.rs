//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. a `--config <path>` CLI flag)
//! 2. `~/.cardseer/config.toml` (user)
//! 3. `/etc/cardseer/config.toml` (system)
//!
//! When no file exists at the implicit locations the built-in defaults apply.
//!
//! ```toml
//! [upstream]
//! url = "https://api.pokemontcg.io/v2/cards"
//! timeout_secs = 12
//! concurrency_limit = 5
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 1000
//! max_delay_ms = 30000
//! jitter_ms = 1000
//!
//! [rate_limit]
//! max_calls = 10
//! interval_secs = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::coordinator::DEFAULT_CONCURRENCY_LIMIT;
use crate::limiter::RateLimitConfig;
use crate::lookup::CardLookupBuilder;
use crate::upstream::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT, RetryConfig};
use crate::{LookupError, Result};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Catalog endpoint and fetch limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamConfig {
    /// Card search endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-attempt timeout in seconds (default: 12).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Simultaneous upstream fetches (default: 5).
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_concurrency_limit() -> usize {
    DEFAULT_CONCURRENCY_LIMIT
}

/// Backoff schedule, in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetrySettings {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay_ms: config.initial_delay.as_millis() as u64,
            max_delay_ms: config.max_delay.as_millis() as u64,
            jitter_ms: config.jitter.as_millis() as u64,
        }
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        RetryConfig::new()
            .max_attempts(settings.max_attempts)
            .initial_delay(Duration::from_millis(settings.initial_delay_ms))
            .max_delay(Duration::from_millis(settings.max_delay_ms))
            .jitter(Duration::from_millis(settings.jitter_ms))
    }
}

/// Per-caller admission control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_calls: usize,
    pub interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        let config = RateLimitConfig::default();
        Self {
            max_calls: config.max_calls,
            interval_secs: config.interval.as_secs(),
        }
    }
}

impl From<RateLimitSettings> for RateLimitConfig {
    fn from(settings: RateLimitSettings) -> Self {
        RateLimitConfig::new()
            .max_calls(settings.max_calls)
            .interval(Duration::from_secs(settings.interval_secs))
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing file of
    /// `~/.cardseer/config.toml` and `/etc/cardseer/config.toml` is used,
    /// falling back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            LookupError::Configuration(msg) => {
                LookupError::Configuration(format!("{msg} (in {path:?})"))
            }
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| LookupError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// A lookup builder preconfigured from this file.
    pub fn into_builder(self) -> CardLookupBuilder {
        CardLookupBuilder::new()
            .catalog_url(self.upstream.url)
            .timeout(Duration::from_secs(self.upstream.timeout_secs))
            .concurrency_limit(self.upstream.concurrency_limit)
            .retry(self.retry.into())
            .rate_limit(self.rate_limit.into())
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(LookupError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".cardseer").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/cardseer/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.upstream.timeout_secs, 12);
        assert_eq!(config.upstream.concurrency_limit, 5);
        assert_eq!(config.rate_limit.max_calls, 10);
        assert_eq!(config.rate_limit.interval_secs, 60);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.jitter_ms, 1000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [retry]
            max_attempts = 5

            [upstream]
            url = "http://localhost:8080/cards"
            "#,
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.upstream.url, "http://localhost:8080/cards");
        assert_eq!(config.upstream.timeout_secs, 12);
    }

    #[test]
    fn retry_settings_convert() {
        let retry: RetryConfig = RetrySettings {
            max_attempts: 2,
            initial_delay_ms: 10,
            max_delay_ms: 50,
            jitter_ms: 0,
        }
        .into();
        assert_eq!(retry.max_attempts, 2);
        assert_eq!(retry.initial_delay, Duration::from_millis(10));
        assert_eq!(retry.max_delay, Duration::from_millis(50));
        assert!(retry.jitter.is_zero());
    }

    #[test]
    fn invalid_toml_rejected() {
        let err = Config::from_toml("[upstream\nurl = 1").unwrap_err();
        assert!(matches!(err, LookupError::Configuration(_)));
    }
}
