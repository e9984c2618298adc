//! `POST /parse-results`: stage the upload, run the parser, relay its JSON

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::errors::ApiError;
use super::AppState;
use crate::error::ServerError;
use crate::script::{MeetMetadata, ScriptOutput};

/// The attachment as received
#[derive(Debug)]
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Upload>,
    metadata: MeetMetadata,
}

/// Oversized bodies are the client's fault; anything else is ours
fn upload_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "Upload exceeds the body limit");
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ServerError::UploadError(err.to_string()).into()
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(upload_error)?;
            // Browsers send an empty nameless part when nothing was picked
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            form.file = Some(Upload {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(upload_error)?;
        let slot = match name.as_str() {
            "meetDate" => &mut form.metadata.meet_date,
            "edition" => &mut form.metadata.edition,
            "meetName" => &mut form.metadata.meet_name,
            "meetLocation" => &mut form.metadata.meet_location,
            "season" => &mut form.metadata.season,
            "url" => &mut form.metadata.url,
            "timing" => &mut form.metadata.timing,
            other => {
                warn!(field = %other, "Ignoring unknown form field");
                continue;
            }
        };
        *slot = value;
    }

    Ok(form)
}

/// Write the upload to a fresh temp file; it is removed when dropped
fn stage_upload(dir: &Path, upload: &Upload) -> Result<NamedTempFile, ServerError> {
    let extension: String = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
        .unwrap_or_default();
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension)
    };

    let mut staged = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    staged.write_all(&upload.bytes)?;
    staged.flush()?;
    Ok(staged)
}

fn failure_details(output: &ScriptOutput) -> String {
    if !output.stderr.trim().is_empty() {
        return output.stderr.clone();
    }
    match output.exit_code {
        Some(code) => format!("Parser exited with status {}", code),
        None => "Parser was terminated by a signal".to_string(),
    }
}

/// Parse results handler
pub async fn parse_results(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart = multipart.map_err(|e| ServerError::UploadError(e.body_text()))?;
    let form = read_form(&mut multipart).await?;

    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    info!(
        file = %upload.file_name,
        size_bytes = upload.bytes.len(),
        meet = %form.metadata.meet_name,
        "Processing upload"
    );

    let staged = stage_upload(&state.upload_dir, &upload)?;
    let output = state.runner.run(staged.path(), &form.metadata).await;
    if let Err(e) = staged.close() {
        warn!(error = %e, "Could not remove staged upload");
    }
    let output = output?;

    if !output.succeeded() {
        warn!(exit_code = ?output.exit_code, stderr = %output.stderr, "Parser failed");
        return Err(ApiError::ProcessingFailed {
            details: failure_details(&output),
        });
    }

    let results: Value = serde_json::from_str(&output.stdout).map_err(|e| {
        warn!(error = %e, "Parser output was not JSON");
        ApiError::UnparseableOutput {
            raw_output: output.stdout.clone(),
        }
    })?;

    let metadata = &form.metadata;
    Ok(Json(json!({
        "message": "File processed successfully",
        "results": results,
        "metadata": {
            "meetDate": metadata.meet_date,
            "edition": metadata.edition,
            "meetName": metadata.meet_name,
            "meetLocation": metadata.meet_location,
            "season": metadata.season,
            "url": metadata.url,
            "timing": metadata.timing,
            "fileName": upload.file_name,
        }
    })))
}
