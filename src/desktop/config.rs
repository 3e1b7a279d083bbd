use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, CorruptionPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory created under the platform data dir
const DATA_DIR_NAME: &str = "timetrack";

/// Optional configuration file inside the data dir
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Offline save queue file inside the data dir
pub const QUEUE_FILE_NAME: &str = "offline-save-queue.json";

/// Project cache file inside the data dir
pub const CACHE_FILE_NAME: &str = "projects-cache.json";

/// Values accepted in `config.toml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    api_token: Option<String>,
    sync_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    corruption_policy: Option<CorruptionPolicy>,
}

/// Application configuration wrapper.
///
/// Resolves the data directory and layers `config.toml` and environment
/// variables over the defaults.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
    data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment and the data dir.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let data_dir = env("TIMETRACK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let file_contents = match std::fs::read_to_string(&config_path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(ConfigError::Read {
                    path: config_path,
                    source,
                })
            }
        };

        Self::from_sources(data_dir, file_contents.as_deref(), env)
    }

    /// Build configuration from explicit sources.
    ///
    /// `file` is the contents of `config.toml`, `env` looks up environment
    /// variables. Environment values override file values.
    pub fn from_sources<F>(data_dir: PathBuf, file: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match file {
            Some(contents) => toml::from_str(contents)?,
            None => FileConfig::default(),
        };

        let mut builder = AppConfig::builder().data_dir(data_dir.clone());

        if let Some(url) = env("TIMETRACK_API_URL").or(file.api_url) {
            builder = builder.api_url(url);
        }
        if let Some(token) = env("TIMETRACK_API_TOKEN").or(file.api_token) {
            builder = builder.api_token(token);
        }
        if let Some(secs) = seconds(&env, "TIMETRACK_SYNC_INTERVAL_SECS", "sync_interval", file.sync_interval_secs)? {
            builder = builder.watch_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = seconds(&env, "TIMETRACK_REQUEST_TIMEOUT_SECS", "request_timeout", file.request_timeout_secs)? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        let policy = match env("TIMETRACK_CORRUPTION_POLICY") {
            Some(value) => Some(value.parse::<CorruptionPolicy>()?),
            None => file.corruption_policy,
        };
        if let Some(policy) = policy {
            builder = builder.corruption_policy(policy);
        }

        Self::with_builder(builder)
    }

    /// Build configuration from a builder; the data dir defaults to the platform dir
    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        let data_dir = app.data_dir.clone().unwrap_or_else(default_data_dir);
        Ok(Self { app, data_dir })
    }

    /// Validated values
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Private data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the offline save queue file
    pub fn queue_path(&self) -> PathBuf {
        self.data_dir.join(QUEUE_FILE_NAME)
    }

    /// Path of the project cache file
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE_NAME)
    }

    /// Base URL of the project API
    pub fn api_base(&self) -> Option<&str> {
        self.app.api_url.as_deref()
    }

    /// Whether a remote endpoint is configured
    pub fn is_remote_configured(&self) -> bool {
        self.app.api_url.is_some()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> Option<String> {
        self.api_base().map(|base| format!("{}{}", base, path))
    }

    /// Get the bearer token
    pub fn api_token(&self) -> Option<&str> {
        self.app.api_token.as_deref()
    }

    pub fn watch_interval(&self) -> Duration {
        self.app.watch_interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout
    }

    pub fn corruption_policy(&self) -> CorruptionPolicy {
        self.app.corruption_policy
    }
}

/// Platform data dir joined with the application folder
fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push(DATA_DIR_NAME);
    path
}

fn seconds<F>(env: &F, key: &str, field: &'static str, fallback: Option<u64>) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { field, value: raw }),
        None => Ok(fallback),
    }
}
