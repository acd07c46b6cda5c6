use crate::error::Error;
use anyhow::Context;
use crate::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::sessions::DEFAULT_POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "JULES_API_KEY";
pub const BASE_URL_ENV: &str = "JULES_BASE_URL";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// API endpoint including the version path.
    pub base_url: String,
    /// Per-request timeout in seconds, 0 for none. Default: 30.
    pub timeout_secs: u64,
    /// Interval between polls while waiting on a session. Default: 5.
    pub poll_interval_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

impl Config {
    /// `<config_dir>/jules/config.toml`.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("jules").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".jules/config.toml"))
    }

    /// Load the config file, then apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::load_from(&Self::path())?;
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Load a config file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply `JULES_API_KEY` / `JULES_BASE_URL` through `lookup`.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        self
    }

    pub fn api_key(&self) -> Result<&str, Error> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no API key; set {API_KEY_ENV} or api_key in {}",
                    Self::path().display()
                ))
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
