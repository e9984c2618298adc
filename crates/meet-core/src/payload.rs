//! Read-only snapshot of a record, ready to be sent.

use crate::error::{CoreError, CoreResult};
use crate::record::{FormField, ResultsFile, SubmissionRecord};
use crate::validation::RequiredField;

/// What a submission sends: the attachment plus every other field as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    /// Text parts in wire order
    pub text_fields: Vec<(FormField, String)>,
    /// Binary part
    pub file: ResultsFile,
}

impl SubmissionPayload {
    /// Snapshot a record. The record must carry an attachment.
    pub fn from_record(record: &SubmissionRecord) -> CoreResult<Self> {
        let file = record
            .results_file
            .clone()
            .ok_or_else(|| CoreError::MissingRequiredFields(vec![RequiredField::ResultsFile]))?;

        let text_fields = vec![
            (FormField::MeetDate, record.meet_date.clone()),
            (FormField::Edition, record.edition.clone()),
            (FormField::MeetName, record.meet_name.clone()),
            (FormField::MeetLocation, record.meet_location.clone()),
            (FormField::Season, record.season.as_str().to_string()),
            (FormField::Url, record.url.clone()),
            (FormField::Timing, record.timing.as_str().to_string()),
        ];

        Ok(Self { text_fields, file })
    }

    /// Text value of a field, if it is part of the payload
    pub fn text(&self, field: FormField) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Text parts keyed by their wire names
    pub fn wire_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.text_fields
            .iter()
            .map(|(field, value)| (field.wire_name(), value.as_str()))
    }
}
