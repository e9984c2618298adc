//!
//! Meet Core - form state and submission lifecycle for the meet results uploader
//!
//! This crate holds the submission record, its validation, the session that
//! drives a submission, and the traits through which the session talks to the
//! processing service, the user, and the place downloads are saved.

#![forbid(unsafe_code)]

/// Seam to the external processing service
pub mod api;

/// Download naming and hand-over
pub mod download;

/// Error types
pub mod error;

/// User notifications
pub mod notify;

/// Submission snapshot
pub mod payload;

/// Submission record and field types
pub mod record;

/// Form state store
pub mod session;

/// Required-field checks
pub mod validation;

// Re-export key types
pub use api::{ApiError, ProcessingApi, ProcessingReply};
pub use download::{derive_download_filename, DownloadReceipt, DownloadSink, DownloadedFile};
pub use error::{CoreError, CoreResult};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use payload::SubmissionPayload;
pub use record::{FieldUpdate, FormField, ResultsFile, Season, SubmissionRecord, Timing};
pub use session::{
    MeetSession, PendingSubmission, SessionId, SubmissionResponse, SubmissionStatus, SubmitOutcome,
};
pub use validation::{missing_required_fields, validate, validation_message, RequiredField};
