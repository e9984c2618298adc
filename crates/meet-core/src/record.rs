//! The submission record and its field types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Competition season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Season {
    /// Indoor season
    #[default]
    Indoor,
    /// Outdoor season
    Outdoor,
}

impl Season {
    /// Text sent to the processing service
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Indoor => "Indoor",
            Season::Outdoor => "Outdoor",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indoor" => Ok(Season::Indoor),
            "outdoor" => Ok(Season::Outdoor),
            other => Err(format!("unknown season '{}', expected Indoor or Outdoor", other)),
        }
    }
}

/// How marks were timed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timing {
    /// Stopwatch timing
    #[default]
    HandTimed,
    /// Fully automatic timing
    FatTimed,
}

impl Timing {
    /// Text sent to the processing service
    pub fn as_str(&self) -> &'static str {
        match self {
            Timing::HandTimed => "Hand-timed",
            Timing::FatTimed => "FAT-timed",
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hand-timed" | "hand" => Ok(Timing::HandTimed),
            "fat-timed" | "fat" => Ok(Timing::FatTimed),
            other => Err(format!("unknown timing '{}', expected Hand-timed or FAT-timed", other)),
        }
    }
}

/// An attached results file
#[derive(Clone, PartialEq, Eq)]
pub struct ResultsFile {
    /// Name the file is uploaded under
    pub file_name: String,
    /// MIME type, when known
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ResultsFile {
    /// Create an attachment from in-memory contents
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Set the MIME type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read an attachment from disk, naming it after the file
    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::Io(format!("Invalid file name: {}", path.display())))?
            .to_string();

        Ok(Self::new(file_name, bytes))
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-byte attachment
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Contents are left out so logs stay readable
impl fmt::Debug for ResultsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Names of the record's fields, as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    MeetDate,
    Edition,
    MeetName,
    MeetLocation,
    Season,
    Url,
    Timing,
    ResultsFile,
}

impl FormField {
    /// Multipart part name
    pub fn wire_name(&self) -> &'static str {
        match self {
            FormField::MeetDate => "meetDate",
            FormField::Edition => "edition",
            FormField::MeetName => "meetName",
            FormField::MeetLocation => "meetLocation",
            FormField::Season => "season",
            FormField::Url => "url",
            FormField::Timing => "timing",
            FormField::ResultsFile => "file",
        }
    }
}

/// A replacement value for exactly one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    MeetDate(String),
    Edition(String),
    MeetName(String),
    MeetLocation(String),
    Season(Season),
    Url(String),
    Timing(Timing),
    ResultsFile(Option<ResultsFile>),
}

impl FieldUpdate {
    /// The field this update targets
    pub fn field(&self) -> FormField {
        match self {
            FieldUpdate::MeetDate(_) => FormField::MeetDate,
            FieldUpdate::Edition(_) => FormField::Edition,
            FieldUpdate::MeetName(_) => FormField::MeetName,
            FieldUpdate::MeetLocation(_) => FormField::MeetLocation,
            FieldUpdate::Season(_) => FormField::Season,
            FieldUpdate::Url(_) => FormField::Url,
            FieldUpdate::Timing(_) => FormField::Timing,
            FieldUpdate::ResultsFile(_) => FormField::ResultsFile,
        }
    }
}

/// Everything the user enters for one meet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub meet_date: String,
    pub edition: String,
    pub meet_name: String,
    pub meet_location: String,
    pub season: Season,
    pub url: String,
    pub timing: Timing,
    pub results_file: Option<ResultsFile>,
}

impl SubmissionRecord {
    /// Replace one field; no validation happens here
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::MeetDate(v) => self.meet_date = v,
            FieldUpdate::Edition(v) => self.edition = v,
            FieldUpdate::MeetName(v) => self.meet_name = v,
            FieldUpdate::MeetLocation(v) => self.meet_location = v,
            FieldUpdate::Season(v) => self.season = v,
            FieldUpdate::Url(v) => self.url = v,
            FieldUpdate::Timing(v) => self.timing = v,
            FieldUpdate::ResultsFile(v) => self.results_file = v,
        }
    }
}
