//! Error types for the meet client

use thiserror::Error;

use meet_core::CoreError;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClientError(String),

    /// Download could not be written
    #[error("Download error: {0}")]
    DownloadError(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::HttpClientError(err.to_string())
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::DownloadError(msg) => CoreError::Download(msg),
            other => CoreError::Network(other.to_string()),
        }
    }
}
