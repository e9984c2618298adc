//! Naming and handing over files returned by the processing service.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// Used when neither the reply nor the record suggests a name
pub const DEFAULT_FILE_NAME: &str = "results.csv";

/// A file returned by the processing service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What remains in the session after a file was offered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReceipt {
    pub file_name: String,
    pub size_bytes: usize,
    /// Where the sink put the file, if it has a location
    pub location: Option<String>,
}

/// Offers a downloaded file to the user
pub trait DownloadSink: Send + Sync {
    /// Hand the file over
    fn offer(&self, file: &DownloadedFile) -> CoreResult<DownloadReceipt>;
}

/// Extract the `filename` parameter of a `Content-Disposition` header.
///
/// Quotes are optional; an unquoted value ends at the next `;`.
/// `filename*` (RFC 5987) is not read.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();
    let start = lower.find("filename=")? + "filename=".len();
    let rest = header[start..].trim_start();

    let name = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split('"').next().unwrap_or("")
    } else {
        rest.split(';').next().unwrap_or("").trim()
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Name the file after the meet: whitespace runs become `_`
pub fn filename_from_meet_name(meet_name: &str) -> Option<String> {
    let words: Vec<&str> = meet_name.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    Some(format!("{}_results.csv", words.join("_")))
}

/// Header name, then meet name, then [`DEFAULT_FILE_NAME`].
///
/// A `Content-Disposition` header without a usable `filename` counts as
/// absent: it falls through to the meet name, not straight to the default.
pub fn derive_download_filename(content_disposition: Option<&str>, meet_name: &str) -> String {
    content_disposition
        .and_then(filename_from_content_disposition)
        .or_else(|| filename_from_meet_name(meet_name))
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}
