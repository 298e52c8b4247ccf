use std::{fs, io, path::{Path, PathBuf}, time::Duration};

use platform_dirs::AppDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::storage::APP_NAME;

pub const DEFAULT_API_HOST: &str = "http://localhost:3000/api/v1";
pub const CONFIG_FILE: &str = "config.toml";

pub const API_HOST_ENV: &str = "CAMPAIGNS_API_HOST";
pub const POLL_INTERVAL_ENV: &str = "CAMPAIGNS_POLL_INTERVAL_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("{name}={value:?} is not a number of milliseconds")]
    InvalidEnv { name: &'static str, value: String },
}

/// Settings read from `config.toml` in the user's config directory.
///
/// ```toml
/// api_host = "https://campaigns.example.com/api/v1"
/// poll_interval_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub api_host: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub session_watch_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_owned(),
            poll_interval_ms: 5_000,
            request_timeout_ms: 10_000,
            session_watch_interval_ms: 1_000,
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> Option<PathBuf> {
        AppDirs::new(Some(APP_NAME), false).map(|dirs| dirs.config_dir.join(CONFIG_FILE))
    }

    /// Defaults, then the config file if it exists, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loading config from {path:?}");
                toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup(API_HOST_ENV).filter(|host| !host.trim().is_empty()) {
            self.api_host = host;
        }
        if let Some(value) = lookup(POLL_INTERVAL_ENV) {
            self.poll_interval_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: POLL_INTERVAL_ENV, value })?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn session_watch_interval(&self) -> Duration {
        Duration::from_millis(self.session_watch_interval_ms.max(1))
    }
}
