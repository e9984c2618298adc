//! Status command.

use anyhow::{Context, Result};
use serde_json::json;

use meet_client::{ClientConfig, StatusProbe};

use super::StatusArgs;
use crate::output::Output;

/// Run the status command.
pub async fn run(_args: StatusArgs, config: &ClientConfig, output: &Output) -> Result<()> {
    let probe = StatusProbe::new(config).context("Failed to create status probe")?;
    let status = probe.check().await;

    if output.is_json() {
        output.json(&json!({ "status": status, "label": status.label() }));
    } else {
        output.info(status.label());
    }
    Ok(())
}
