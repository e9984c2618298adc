//! Error handling for the meet server API
//!
//! Every failure leaves the handler as one of these, rendered as a JSON body
//! with an `error` key.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::error::ServerError;

/// API Error type for returning standard error responses
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Body over the upload limit (413)
    PayloadTooLarge(String),
    /// The parser exited uncleanly (500)
    ProcessingFailed {
        /// What the parser wrote to stderr
        details: String,
    },
    /// The parser's stdout was not JSON (500)
    UnparseableOutput {
        /// Everything the parser wrote to stdout
        raw_output: String,
    },
    /// Wrapped server error (500)
    ServerError(ServerError),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        ApiError::ServerError(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {}", msg),
            ApiError::ProcessingFailed { details } => write!(f, "Error processing file: {}", details),
            ApiError::UnparseableOutput { .. } => write!(f, "Error parsing script output"),
            ApiError::ServerError(err) => write!(f, "Server Error: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": msg })),
            ApiError::ProcessingFailed { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Error processing file",
                    "details": details,
                }),
            ),
            ApiError::UnparseableOutput { raw_output } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Error parsing script output",
                    "rawOutput": raw_output,
                }),
            ),
            ApiError::ServerError(err) => {
                // Details stay in the log
                error!(error = %err, "Error processing request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Error processing request" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_request_body() {
        let (status, body) = render(ApiError::BadRequest("No file uploaded".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded"}));
    }

    #[tokio::test]
    async fn test_payload_too_large_body() {
        let (status, body) = render(ApiError::PayloadTooLarge("length limit exceeded".to_string())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({"error": "length limit exceeded"}));
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let (status, body) = render(ServerError::UploadError("disk full".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing request"}));
    }

    #[tokio::test]
    async fn test_unparseable_output_keeps_raw() {
        let (_, body) = render(ApiError::UnparseableOutput {
            raw_output: "not json".to_string(),
        })
        .await;
        assert_eq!(body["rawOutput"], "not json");
    }
}
