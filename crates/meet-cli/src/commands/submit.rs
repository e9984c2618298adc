//! Submit command: fill the form, validate, send, report.

use anyhow::{bail, Context, Result};
use serde_json::json;

use meet_client::{ClientConfig, DirectoryDownloadSink, ProcessingClient, StatusProbe};
use meet_core::{validation_message, MeetSession, SubmissionResponse, SubmitOutcome};

use super::SubmitArgs;
use crate::output::{notifier_for, Output};

/// Run the submit command.
pub async fn run(args: SubmitArgs, config: &ClientConfig, output: &Output) -> Result<()> {
    let mut session = MeetSession::new();
    for update in args.field_updates()? {
        session.update_field(update);
    }

    // Blocked submissions never reach the network
    if let Some(message) = validation_message(&session.missing_required_fields()) {
        bail!(message);
    }

    if args.wake {
        let probe = StatusProbe::new(config).context("Failed to create status probe")?;
        let status = probe.wake(|s| output.info(s.label())).await;
        output.info(status.label());
    }

    let client = ProcessingClient::new(config).context("Failed to create HTTP client")?;
    let out_dir = args.out_dir.clone().unwrap_or_else(|| config.download_dir.clone());
    let sink = DirectoryDownloadSink::new(out_dir);
    let notifier = notifier_for(*output);

    output.info(&format!("Submitting to {}", client.endpoint()));
    let outcome = session
        .submit(&client, &sink, notifier.as_ref())
        .await
        .context("Submission failed")?;

    match outcome {
        SubmitOutcome::Completed(SubmissionResponse::Summary(summary)) => output.json(&summary),
        SubmitOutcome::Completed(SubmissionResponse::Download(receipt)) => {
            if output.is_json() {
                output.json(&json!(receipt));
            } else {
                let location = receipt.location.as_deref().unwrap_or(&receipt.file_name);
                output.info(&format!("Saved {} ({} bytes)", location, receipt.size_bytes));
            }
        }
        SubmitOutcome::AlreadyPending | SubmitOutcome::Discarded => {
            output.info("Submission was not completed");
        }
    }

    Ok(())
}
