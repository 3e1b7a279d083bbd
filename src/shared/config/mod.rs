//! Application configuration module
//!
//! Provides the validated configuration values used by the sync core and the
//! builder that produces them.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default interval between periodic queue checks
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(60);

/// Default per-request timeout of the HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// What to do with a store file that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptionPolicy {
    /// Overwrite the file with an empty list
    #[default]
    Reset,
    /// Rename the file aside, then start from an empty list
    Quarantine,
}

impl FromStr for CorruptionPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "quarantine" => Ok(Self::Quarantine),
            other => Err(ConfigError::InvalidValue {
                field: "corruption_policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Base URL of the project API; `None` means not configured
    pub api_url: Option<String>,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Private data directory holding the queue and cache files
    pub data_dir: Option<PathBuf>,
    /// Interval of the periodic queue watcher
    pub watch_interval: Duration,
    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
    /// Recovery policy for unparseable store files
    pub corruption_policy: CorruptionPolicy,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.watch_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "watch_interval",
                value: "0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_url: Option<String>,
    api_token: Option<String>,
    data_dir: Option<PathBuf>,
    watch_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    corruption_policy: Option<CorruptionPolicy>,
}

impl AppConfigBuilder {
    /// Set the API base URL; a trailing slash is dropped
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/').to_string();
        self.api_url = if trimmed.is_empty() { None } else { Some(trimmed) };
        self
    }

    /// Set the bearer token
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the watcher interval
    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = Some(interval);
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the corruption policy
    pub fn corruption_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.corruption_policy = Some(policy);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            api_url: self.api_url,
            api_token: self.api_token,
            data_dir: self.data_dir,
            watch_interval: self.watch_interval.unwrap_or(DEFAULT_WATCH_INTERVAL),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            corruption_policy: self.corruption_policy.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
