//! The form state store: one live record, its status, and the submission lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, ProcessingApi, ProcessingReply};
use crate::download::{derive_download_filename, DownloadReceipt, DownloadSink, DownloadedFile};
use crate::error::{CoreError, CoreResult};
use crate::notify::{Notice, Notifier};
use crate::payload::SubmissionPayload;
use crate::record::{FieldUpdate, FormField, SubmissionRecord};
use crate::validation::{self, RequiredField};

/// Value object: Session ID, minted on creation and on every reset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Nothing submitted since the last reset
    #[default]
    Idle,
    /// A request is outstanding
    Pending,
    /// The last attempt succeeded
    Success,
    /// The last attempt failed
    Error,
}

/// What a successful submission left behind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmissionResponse {
    /// JSON summary returned by the service
    Summary(Value),
    /// A file that was offered to the user
    Download(DownloadReceipt),
}

/// Result of a call to [`MeetSession::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The attempt ran to completion
    Completed(SubmissionResponse),
    /// A request was already outstanding; nothing was sent
    AlreadyPending,
    /// The session was reset while the request was in flight; the reply was dropped
    Discarded,
}

/// A submission that has been started but not yet completed
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    /// Session the submission belongs to
    pub session_id: SessionId,
    /// Snapshot that is sent
    pub payload: SubmissionPayload,
}

/// Form state store for one upload session
#[derive(Debug, Clone)]
pub struct MeetSession {
    id: SessionId,
    record: SubmissionRecord,
    status: SubmissionStatus,
    response: Option<SubmissionResponse>,
    last_error: Option<CoreError>,
}

impl Default for MeetSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MeetSession {
    /// Create a session with a default record
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            record: SubmissionRecord::default(),
            status: SubmissionStatus::Idle,
            response: None,
            last_error: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn record(&self) -> &SubmissionRecord {
        &self.record
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Response stored by the last successful attempt
    pub fn response(&self) -> Option<&SubmissionResponse> {
        self.response.as_ref()
    }

    /// Error of the last failed attempt
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }

    /// Replace one field. Never validates, never fails.
    pub fn update_field(&mut self, update: FieldUpdate) {
        debug!(session_id = %self.id, field = update.field().wire_name(), "Updating field");
        self.record.apply(update);
    }

    pub fn missing_required_fields(&self) -> Vec<RequiredField> {
        validation::missing_required_fields(&self.record)
    }

    pub fn validate(&self) -> CoreResult<()> {
        validation::validate(&self.record)
    }

    /// Discard the record and every derived flag
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.id, SessionId::generate());
        self.record = SubmissionRecord::default();
        self.status = SubmissionStatus::Idle;
        self.response = None;
        self.last_error = None;
        info!(previous = %previous, session_id = %self.id, "Form reset");
    }

    /// First half of a submission.
    ///
    /// Returns `Ok(None)` while another submission is pending. Fails without
    /// touching the status when a required field is missing. Otherwise the
    /// session moves to `Pending` and the snapshot to send is returned.
    pub fn begin_submission(&mut self) -> CoreResult<Option<PendingSubmission>> {
        if self.is_pending() {
            debug!(session_id = %self.id, "Submission already pending, ignoring");
            return Ok(None);
        }

        self.validate()?;
        let payload = SubmissionPayload::from_record(&self.record)?;

        self.status = SubmissionStatus::Pending;
        self.response = None;
        self.last_error = None;

        Ok(Some(PendingSubmission {
            session_id: self.id.clone(),
            payload,
        }))
    }

    /// Second half of a submission: interpret the reply and settle the status
    pub fn complete_submission(
        &mut self,
        pending: &PendingSubmission,
        result: Result<ProcessingReply, ApiError>,
        sink: &dyn DownloadSink,
        notifier: &dyn Notifier,
    ) -> CoreResult<SubmitOutcome> {
        if pending.session_id != self.id || !self.is_pending() {
            warn!(
                session_id = %self.id,
                submission_session = %pending.session_id,
                "Dropping reply for a submission that is no longer current"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        match interpret_reply(&pending.payload, result, sink) {
            Ok(response) => {
                info!(session_id = %self.id, "Submission processed");
                self.status = SubmissionStatus::Success;
                self.response = Some(response.clone());
                notifier.notify(&Notice::Submitted);
                Ok(SubmitOutcome::Completed(response))
            }
            Err(err) => {
                error!(session_id = %self.id, error = %err, "Error submitting meet data");
                self.status = SubmissionStatus::Error;
                self.last_error = Some(err.clone());
                notifier.notify(&Notice::Failed {
                    detail: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Validate, send one request, and record the outcome.
    ///
    /// No retry and no timeout; a failed attempt stays failed until the
    /// user submits again.
    pub async fn submit(
        &mut self,
        api: &dyn ProcessingApi,
        sink: &dyn DownloadSink,
        notifier: &dyn Notifier,
    ) -> CoreResult<SubmitOutcome> {
        let pending = match self.begin_submission()? {
            Some(pending) => pending,
            None => return Ok(SubmitOutcome::AlreadyPending),
        };

        info!(
            session_id = %self.id,
            file = %pending.payload.file.file_name,
            size_bytes = pending.payload.file.len(),
            "Submitting meet data"
        );
        let result = api.process(&pending.payload).await;
        self.complete_submission(&pending, result, sink, notifier)
    }
}

fn interpret_reply(
    payload: &SubmissionPayload,
    result: Result<ProcessingReply, ApiError>,
    sink: &dyn DownloadSink,
) -> CoreResult<SubmissionResponse> {
    let reply = result?;

    if !reply.is_success() {
        return Err(CoreError::Http {
            status: reply.status,
            body: reply.body_text(),
        });
    }

    if reply.is_json() {
        let summary: Value = serde_json::from_slice(&reply.body).map_err(|e| {
            CoreError::UnparseableResponse {
                reason: e.to_string(),
                raw: reply.body_text(),
            }
        })?;
        return Ok(SubmissionResponse::Summary(summary));
    }

    let meet_name = payload.text(FormField::MeetName).unwrap_or("");
    let file = DownloadedFile {
        file_name: derive_download_filename(reply.content_disposition.as_deref(), meet_name),
        content_type: reply.content_type,
        bytes: reply.body,
    };
    debug!(file_name = %file.file_name, size_bytes = file.bytes.len(), "Offering download");
    let receipt = sink.offer(&file)?;
    Ok(SubmissionResponse::Download(receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ResultsFile, Season, Timing};
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    mock! {
        pub Api {}

        #[async_trait]
        impl ProcessingApi for Api {
            async fn process(&self, payload: &SubmissionPayload) -> Result<ProcessingReply, ApiError>;
        }
    }

    mock! {
        pub Sink {}

        impl DownloadSink for Sink {
            fn offer(&self, file: &DownloadedFile) -> CoreResult<DownloadReceipt>;
        }
    }

    mock! {
        pub Notify {}

        impl Notifier for Notify {
            fn notify(&self, notice: &Notice);
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    fn filled_session() -> MeetSession {
        let mut session = MeetSession::new();
        session.update_field(FieldUpdate::MeetDate("2024-04-13".to_string()));
        session.update_field(FieldUpdate::MeetName("Spring Classic".to_string()));
        session.update_field(FieldUpdate::MeetLocation("Central Stadium".to_string()));
        session.update_field(FieldUpdate::ResultsFile(Some(ResultsFile::new(
            "results.txt",
            b"Event 1 Boys 100m".to_vec(),
        ))));
        session
    }

    fn csv_reply(disposition: Option<&str>) -> ProcessingReply {
        ProcessingReply {
            status: 200,
            content_type: Some("text/csv".to_string()),
            content_disposition: disposition.map(str::to_string),
            body: b"Event,Place\n100m,1\n".to_vec(),
        }
    }

    fn quiet_notifier() -> MockNotify {
        let mut notifier = MockNotify::new();
        notifier.expect_notify().returning(|_| ());
        notifier
    }

    fn receipt_for(file: &DownloadedFile) -> CoreResult<DownloadReceipt> {
        Ok(DownloadReceipt {
            file_name: file.file_name.clone(),
            size_bytes: file.bytes.len(),
            location: None,
        })
    }

    #[test]
    fn test_new_session_defaults() {
        let session = MeetSession::new();
        assert_eq!(session.status(), SubmissionStatus::Idle);
        assert_eq!(session.record(), &SubmissionRecord::default());
        assert!(session.response().is_none());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_update_field_never_validates() {
        let mut session = MeetSession::new();
        session.update_field(FieldUpdate::Url("not a url".to_string()));
        session.update_field(FieldUpdate::Timing(Timing::FatTimed));
        assert_eq!(session.record().url, "not a url");
        assert_eq!(session.record().timing, Timing::FatTimed);
    }

    #[tokio::test]
    async fn test_json_reply_is_stored() {
        let mut session = filled_session();

        let mut api = MockApi::new();
        api.expect_process()
            .times(1)
            .withf(|payload: &SubmissionPayload| payload.text(FormField::MeetName) == Some("Spring Classic"))
            .returning(|_| {
                Ok(ProcessingReply {
                    status: 200,
                    content_type: Some("application/json".to_string()),
                    content_disposition: None,
                    body: br#"{"success":true,"rows":12}"#.to_vec(),
                })
            });
        let mut sink = MockSink::new();
        sink.expect_offer().times(0);
        let mut notifier = MockNotify::new();
        notifier
            .expect_notify()
            .with(eq(Notice::Submitted))
            .times(1)
            .returning(|_| ());

        let outcome = session.submit(&api, &sink, &notifier).await.unwrap();

        let expected = SubmissionResponse::Summary(json!({"success": true, "rows": 12}));
        assert_eq!(outcome, SubmitOutcome::Completed(expected.clone()));
        assert_eq!(session.status(), SubmissionStatus::Success);
        assert_eq!(session.response(), Some(&expected));
    }

    #[tokio::test]
    async fn test_binary_reply_uses_header_filename() {
        let mut session = filled_session();

        let mut api = MockApi::new();
        api.expect_process()
            .times(1)
            .returning(|_| Ok(csv_reply(Some(r#"attachment; filename="results_A.csv""#))));
        let mut sink = MockSink::new();
        sink.expect_offer()
            .withf(|file: &DownloadedFile| file.file_name == "results_A.csv")
            .times(1)
            .returning(receipt_for);

        let outcome = session.submit(&api, &sink, &quiet_notifier()).await.unwrap();

        match outcome {
            SubmitOutcome::Completed(SubmissionResponse::Download(receipt)) => {
                assert_eq!(receipt.file_name, "results_A.csv");
                assert_eq!(receipt.size_bytes, 19);
            }
            other => panic!("Expected a download, got {:?}", other),
        }
        assert_eq!(session.status(), SubmissionStatus::Success);
    }

    #[tokio::test]
    async fn test_binary_reply_falls_back_to_meet_name() {
        let mut session = filled_session();

        let mut api = MockApi::new();
        api.expect_process().times(1).returning(|_| Ok(csv_reply(None)));
        let mut sink = MockSink::new();
        sink.expect_offer()
            .withf(|file: &DownloadedFile| file.file_name == "Spring_Classic_results.csv")
            .times(1)
            .returning(receipt_for);

        session.submit(&api, &sink, &quiet_notifier()).await.unwrap();
        assert_eq!(session.status(), SubmissionStatus::Success);
    }

    #[tokio::test]
    async fn test_missing_fields_block_the_request() {
        let mut session = MeetSession::new();
        session.update_field(FieldUpdate::MeetName("Spring Classic".to_string()));

        let mut api = MockApi::new();
        api.expect_process().times(0);
        let mut sink = MockSink::new();
        sink.expect_offer().times(0);
        let mut notifier = MockNotify::new();
        notifier.expect_notify().times(0);

        let err = session.submit(&api, &sink, &notifier).await.unwrap_err();

        assert_eq!(
            err,
            CoreError::MissingRequiredFields(vec![
                RequiredField::MeetDate,
                RequiredField::MeetLocation,
                RequiredField::ResultsFile,
            ])
        );
        assert_eq!(session.status(), SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_a_noop() {
        let mut session = filled_session();
        let pending = session.begin_submission().unwrap();
        assert!(pending.is_some());
        assert_eq!(session.status(), SubmissionStatus::Pending);

        let mut api = MockApi::new();
        api.expect_process().times(0);
        let mut sink = MockSink::new();
        sink.expect_offer().times(0);
        let mut notifier = MockNotify::new();
        notifier.expect_notify().times(0);

        let outcome = session.submit(&api, &sink, &notifier).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::AlreadyPending);
        assert_eq!(session.status(), SubmissionStatus::Pending);
        assert!(session.begin_submission().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_http_error_keeps_the_record() {
        init_tracing();
        let mut session = filled_session();
        session.update_field(FieldUpdate::Season(Season::Outdoor));
        let before = session.record().clone();

        let mut api = MockApi::new();
        api.expect_process().times(1).returning(|_| {
            Ok(ProcessingReply {
                status: 502,
                content_type: Some("text/plain".to_string()),
                content_disposition: None,
                body: b"upstream asleep".to_vec(),
            })
        });
        let mut sink = MockSink::new();
        sink.expect_offer().times(0);
        let mut notifier = MockNotify::new();
        notifier
            .expect_notify()
            .withf(|notice: &Notice| matches!(notice, Notice::Failed { .. }))
            .times(1)
            .returning(|_| ());

        let err = session.submit(&api, &sink, &notifier).await.unwrap_err();

        assert_eq!(
            err,
            CoreError::Http {
                status: 502,
                body: "upstream asleep".to_string()
            }
        );
        assert_eq!(session.status(), SubmissionStatus::Error);
        assert_eq!(session.record(), &before);
        assert!(session.response().is_none());
        assert_eq!(session.last_error(), Some(&err));
    }

    #[tokio::test]
    async fn test_network_error_sets_error_status() {
        let mut session = filled_session();

        let mut api = MockApi::new();
        api.expect_process()
            .times(1)
            .returning(|_| Err(ApiError::Network("connection refused".to_string())));
        let sink = MockSink::new();

        let err = session.submit(&api, &sink, &quiet_notifier()).await.unwrap_err();

        assert_eq!(err, CoreError::Network("connection refused".to_string()));
        assert_eq!(session.status(), SubmissionStatus::Error);
        assert!(!session.record().meet_name.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_json_keeps_raw_body() {
        let mut session = filled_session();

        let mut api = MockApi::new();
        api.expect_process().times(1).returning(|_| {
            Ok(ProcessingReply {
                status: 200,
                content_type: Some("application/json".to_string()),
                content_disposition: None,
                body: b"Internal parser crashed".to_vec(),
            })
        });
        let sink = MockSink::new();

        let err = session.submit(&api, &sink, &quiet_notifier()).await.unwrap_err();

        assert_eq!(err.raw_body(), Some("Internal parser crashed"));
        assert!(matches!(err, CoreError::UnparseableResponse { .. }));
        assert_eq!(session.status(), SubmissionStatus::Error);
    }

    #[tokio::test]
    async fn test_sink_failure_is_reported() {
        let mut session = filled_session();

        let mut api = MockApi::new();
        api.expect_process().times(1).returning(|_| Ok(csv_reply(None)));
        let mut sink = MockSink::new();
        sink.expect_offer()
            .times(1)
            .returning(|_| Err(CoreError::Download("read-only directory".to_string())));

        let err = session.submit(&api, &sink, &quiet_notifier()).await.unwrap_err();

        assert_eq!(err, CoreError::Download("read-only directory".to_string()));
        assert_eq!(session.status(), SubmissionStatus::Error);
    }

    #[tokio::test]
    async fn test_resubmit_after_error() {
        let mut session = filled_session();

        let mut failing = MockApi::new();
        failing
            .expect_process()
            .times(1)
            .returning(|_| Err(ApiError::Network("timeout".to_string())));
        let sink = MockSink::new();
        assert!(session.submit(&failing, &sink, &quiet_notifier()).await.is_err());

        let mut working = MockApi::new();
        working.expect_process().times(1).returning(|_| {
            Ok(ProcessingReply {
                status: 200,
                content_type: Some("application/json".to_string()),
                content_disposition: None,
                body: b"{}".to_vec(),
            })
        });
        session.submit(&working, &sink, &quiet_notifier()).await.unwrap();

        assert_eq!(session.status(), SubmissionStatus::Success);
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_everything_from_any_state() {
        let mut session = filled_session();
        let mut api = MockApi::new();
        api.expect_process().times(1).returning(|_| {
            Ok(ProcessingReply {
                status: 200,
                content_type: Some("application/json".to_string()),
                content_disposition: None,
                body: b"{\"ok\":true}".to_vec(),
            })
        });
        session.submit(&api, &MockSink::new(), &quiet_notifier()).await.unwrap();
        assert!(session.response().is_some());
        let old_id = session.id().clone();

        session.reset();

        assert_eq!(session.status(), SubmissionStatus::Idle);
        assert_eq!(session.record(), &SubmissionRecord::default());
        assert!(session.response().is_none());
        assert!(session.last_error().is_none());
        assert_ne!(session.id(), &old_id);

        let mut pending_session = filled_session();
        pending_session.begin_submission().unwrap();
        pending_session.reset();
        assert_eq!(pending_session.status(), SubmissionStatus::Idle);
        assert_eq!(pending_session.record(), &SubmissionRecord::default());
    }

    #[test]
    fn test_reply_after_reset_is_discarded() {
        let mut session = filled_session();
        let pending = session.begin_submission().unwrap().unwrap();
        session.reset();

        let mut sink = MockSink::new();
        sink.expect_offer().times(0);
        let mut notifier = MockNotify::new();
        notifier.expect_notify().times(0);

        let outcome = session
            .complete_submission(&pending, Ok(csv_reply(None)), &sink, &notifier)
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Discarded);
        assert_eq!(session.status(), SubmissionStatus::Idle);
        assert!(session.response().is_none());
    }
}
