//! Multipart submission to the processing service

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, instrument};

use meet_core::{ApiError, FormField, ProcessingApi, ProcessingReply, SubmissionPayload};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Sends submissions to the processing service.
///
/// No request timeout is set: the service may be cold-starting and a
/// submission waits for as long as it takes.
#[derive(Debug, Clone)]
pub struct ProcessingClient {
    endpoint: String,
    client: Client,
}

impl ProcessingClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            endpoint: config.endpoint_url(),
            client,
        })
    }

    /// Endpoint submissions are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the multipart body: the attachment under `file`, every other field as text
    pub fn build_form(payload: &SubmissionPayload) -> Result<Form, ApiError> {
        let mut file_part =
            Part::bytes(payload.file.bytes.clone()).file_name(payload.file.file_name.clone());
        if let Some(content_type) = &payload.file.content_type {
            file_part = file_part
                .mime_str(content_type)
                .map_err(|e| ApiError::Request(format!("invalid content type '{}': {}", content_type, e)))?;
        }

        let mut form = Form::new().part(FormField::ResultsFile.wire_name(), file_part);
        for (name, value) in payload.wire_fields() {
            form = form.text(name, value.to_string());
        }
        Ok(form)
    }

    fn map_http_error(error: reqwest::Error) -> ApiError {
        if error.is_builder() {
            ApiError::Request(error.to_string())
        } else if error.is_connect() {
            ApiError::Network(format!("Connection error: {}", error))
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl ProcessingApi for ProcessingClient {
    #[instrument(skip(self, payload), fields(endpoint = %self.endpoint, file = %payload.file.file_name))]
    async fn process(&self, payload: &SubmissionPayload) -> Result<ProcessingReply, ApiError> {
        let form = Self::build_form(payload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_http_error)?;

        let status = response.status().as_u16();
        let content_type = header_text(response.headers(), CONTENT_TYPE);
        let content_disposition = header_text(response.headers(), CONTENT_DISPOSITION);

        let body = response.bytes().await.map_err(Self::map_http_error)?.to_vec();
        debug!(status, size_bytes = body.len(), content_type = ?content_type, "Received reply");

        Ok(ProcessingReply {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

/// Header value as text. Bytes outside visible ASCII are decoded as UTF-8,
/// so a raw `filename="résultats.csv"` survives.
fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}
