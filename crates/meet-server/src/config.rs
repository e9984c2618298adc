//! Configuration for the meet server
//!
//! This module contains the configuration type and its environment loader.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Program that runs the parser script
    #[serde(default = "default_interpreter")]
    pub script_interpreter: String,

    /// Parser script handed to the interpreter
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Directory uploads are staged in while the script runs
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest accepted request body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    5000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_script_path() -> PathBuf {
    PathBuf::from("python/parse_file.py")
}

fn default_upload_dir() -> PathBuf {
    env::temp_dir()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    ///
    /// Bad numbers fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }

        if let Some(host) = lookup("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(interpreter) = lookup("SCRIPT_INTERPRETER") {
            config.script_interpreter = interpreter;
        }

        if let Some(script) = lookup("SCRIPT_PATH") {
            config.script_path = PathBuf::from(script);
        }

        if let Some(dir) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }

        if let Some(max) = lookup("MAX_UPLOAD_BYTES") {
            if let Ok(bytes) = max.parse::<usize>() {
                config.max_upload_bytes = bytes;
            } else {
                warn!("Invalid MAX_UPLOAD_BYTES value: {}", max);
            }
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if config.script_interpreter.trim().is_empty() {
            return Err(ServerError::ConfigError(
                "Script interpreter is required".to_string(),
            ));
        }

        if !config.script_path.exists() {
            warn!(
                "Parser script {} does not exist; uploads will fail until it does",
                config.script_path.display()
            );
        }

        info!("Loaded server configuration");
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            script_interpreter: default_interpreter(),
            script_path: default_script_path(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> (ServerResult<ServerConfig>, String) {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || {
            ServerConfig::from_lookup(|key| vars.get(key).cloned())
        });
        let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
        (config, text)
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.script_interpreter, "python3");
    }

    #[test]
    fn test_bad_numbers_keep_defaults_and_warn() {
        let (config, logs) = load_with(&[
            ("SERVER_PORT", "http"),
            ("MAX_UPLOAD_BYTES", "ten"),
            ("SCRIPT_PATH", "/nonexistent/parse_file.py"),
        ]);
        let config = config.unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(logs.contains("Invalid SERVER_PORT value: http"), "logs: {}", logs);
        assert!(logs.contains("Invalid MAX_UPLOAD_BYTES value: ten"));
        assert!(logs.contains("/nonexistent/parse_file.py does not exist"));
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let (config, _) = load_with(&[("SERVER_PORT", "8080"), ("MAX_UPLOAD_BYTES", "2048")]);
        let config = config.unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn test_blank_interpreter_is_rejected() {
        let (config, _) = load_with(&[("SCRIPT_INTERPRETER", "  ")]);
        assert!(matches!(config, Err(ServerError::ConfigError(_))));
    }
}
