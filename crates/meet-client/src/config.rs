//! Configuration for the meet client
//!
//! Values come from the environment (and a `.env` file when present).

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the processing service
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path of the processing endpoint, relative to `api_url`
    #[serde(default = "default_parse_path")]
    pub parse_path: String,

    /// Timeout of the status probe in milliseconds
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,

    /// Delay between a wake request and the re-check, in seconds
    #[serde(default = "default_wake_recheck_secs")]
    pub wake_recheck_secs: u64,

    /// Where downloaded files are saved
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "https://track-api-pbqe.onrender.com".to_string()
}

fn default_parse_path() -> String {
    "/parse-results".to_string()
}

fn default_health_timeout_ms() -> u64 {
    3000
}

fn default_wake_recheck_secs() -> u64 {
    5
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            parse_path: default_parse_path(),
            health_timeout_ms: default_health_timeout_ms(),
            wake_recheck_secs: default_wake_recheck_secs(),
            download_dir: default_download_dir(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn load() -> ClientResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    ///
    /// Unparseable numbers keep their default and log a warning, so a
    /// subscriber should be installed before this runs.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(api_url) = lookup("PROCESSING_API_URL") {
            config.api_url = api_url;
        }

        if let Some(parse_path) = lookup("PROCESSING_API_PATH") {
            config.parse_path = parse_path;
        }

        if let Some(timeout) = lookup("HEALTH_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                config.health_timeout_ms = ms;
            } else {
                warn!("Invalid HEALTH_TIMEOUT_MS value: {}", timeout);
            }
        }

        if let Some(recheck) = lookup("WAKE_RECHECK_SECS") {
            if let Ok(secs) = recheck.parse::<u64>() {
                config.wake_recheck_secs = secs;
            } else {
                warn!("Invalid WAKE_RECHECK_SECS value: {}", recheck);
            }
        }

        if let Some(dir) = lookup("DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        info!(api_url = %config.api_url, "Loaded client configuration");
        Ok(config)
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> ClientResult<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "Processing API URL must be http(s): {}",
                self.api_url
            )));
        }
        Ok(())
    }

    /// Full URL of the processing endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.parse_path.trim_start_matches('/')
        )
    }

    /// Base URL the status probe hits
    pub fn base_url(&self) -> String {
        format!("{}/", self.api_url.trim_end_matches('/'))
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn wake_recheck_delay(&self) -> Duration {
        Duration::from_secs(self.wake_recheck_secs)
    }

    /// Same settings, different service
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}
