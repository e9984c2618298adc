//! Presence checks run before a submission is issued.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::record::SubmissionRecord;

/// Fields that must be filled before submitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredField {
    MeetDate,
    MeetName,
    MeetLocation,
    ResultsFile,
}

impl RequiredField {
    /// All required fields, in form order
    pub const ALL: [RequiredField; 4] = [
        RequiredField::MeetDate,
        RequiredField::MeetName,
        RequiredField::MeetLocation,
        RequiredField::ResultsFile,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::MeetDate => "meet date",
            RequiredField::MeetName => "meet name",
            RequiredField::MeetLocation => "meet location",
            RequiredField::ResultsFile => "results file",
        }
    }

    fn is_present(&self, record: &SubmissionRecord) -> bool {
        match self {
            RequiredField::MeetDate => !record.meet_date.trim().is_empty(),
            RequiredField::MeetName => !record.meet_name.trim().is_empty(),
            RequiredField::MeetLocation => !record.meet_location.trim().is_empty(),
            RequiredField::ResultsFile => record.results_file.is_some(),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Required fields that are blank or absent, in form order
pub fn missing_required_fields(record: &SubmissionRecord) -> Vec<RequiredField> {
    RequiredField::ALL
        .iter()
        .copied()
        .filter(|field| !field.is_present(record))
        .collect()
}

/// Fail with [`CoreError::MissingRequiredFields`] unless every required field is present
pub fn validate(record: &SubmissionRecord) -> CoreResult<()> {
    let missing = missing_required_fields(record);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::MissingRequiredFields(missing))
    }
}

/// Inline message shown when a submission is blocked
pub fn validation_message(missing: &[RequiredField]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
    Some(format!(
        "Please complete all required fields (missing: {}).",
        labels.join(", ")
    ))
}
