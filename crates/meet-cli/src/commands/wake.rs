//! Wake command.

use anyhow::{Context, Result};
use serde_json::json;

use meet_client::{ApiStatus, ClientConfig, StatusProbe};

use super::WakeArgs;
use crate::output::Output;

/// Run the wake command.
pub async fn run(_args: WakeArgs, config: &ClientConfig, output: &Output) -> Result<()> {
    let probe = StatusProbe::new(config).context("Failed to create status probe")?;

    if probe.check().await == ApiStatus::Online {
        output.info(ApiStatus::Online.label());
        return Ok(());
    }

    let status = probe.wake(|booting| output.info(booting.label())).await;

    if output.is_json() {
        output.json(&json!({ "status": status, "label": status.label() }));
    } else {
        output.info(status.label());
    }
    Ok(())
}
