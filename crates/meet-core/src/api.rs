//! Seam to the external processing service.

use async_trait::async_trait;
use thiserror::Error;

use crate::payload::SubmissionPayload;

/// Transport-level failures; status codes are judged by the session, not here
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be built
    #[error("Request error: {0}")]
    Request(String),

    /// Connection, DNS, TLS or body read failure
    #[error("Network error: {0}")]
    Network(String),
}

/// Raw reply from the processing service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessingReply {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header
    pub content_type: Option<String>,
    /// `Content-Disposition` header
    pub content_disposition: Option<String>,
    /// Reply body
    pub body: Vec<u8>,
}

impl ProcessingReply {
    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body should be read as a JSON summary
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }

    /// Body as text, lossy
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can take a payload to the processing service
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Send one submission. Exactly one outbound request per call.
    async fn process(&self, payload: &SubmissionPayload) -> Result<ProcessingReply, ApiError>;
}
