use thiserror::Error;

use crate::validation::RequiredField;

/// Core error type for the meet results uploader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// One or more required fields are blank; no request was issued
    #[error("Missing required fields: {}", describe_fields(.0))]
    MissingRequiredFields(Vec<RequiredField>),

    /// The processing service answered with a non-success status code
    #[error("Processing service returned HTTP {status}")]
    Http {
        /// Status code of the reply
        status: u16,
        /// Raw reply body, kept for diagnostics
        body: String,
    },

    /// The request never produced a reply
    #[error("Network error: {0}")]
    Network(String),

    /// The reply claimed to be JSON but could not be parsed
    #[error("Unparseable response: {reason}")]
    UnparseableResponse {
        /// Parser message
        reason: String,
        /// Raw reply body, kept for diagnostics
        raw: String,
    },

    /// The downloaded file could not be handed to the user
    #[error("Download error: {0}")]
    Download(String),

    /// Input/output error
    #[error("Input/output error: {0}")]
    Io(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

fn describe_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoreError {
    /// True for errors caught before any network call
    pub fn is_validation_error(&self) -> bool {
        matches!(self, CoreError::MissingRequiredFields(_))
    }

    /// True for HTTP and network failures
    pub fn is_transport_error(&self) -> bool {
        matches!(self, CoreError::Http { .. } | CoreError::Network(_))
    }

    /// Raw reply body when the error carries one
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            CoreError::Http { body, .. } => Some(body),
            CoreError::UnparseableResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<crate::api::ApiError> for CoreError {
    fn from(err: crate::api::ApiError) -> Self {
        match err {
            crate::api::ApiError::Network(msg) => CoreError::Network(msg),
            crate::api::ApiError::Request(msg) => CoreError::Network(format!("could not build request: {}", msg)),
        }
    }
}
