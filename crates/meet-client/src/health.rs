//! Status probe for the processing service.
//!
//! The hosted service sleeps when idle. `check` answers quickly with whether
//! it is up; `wake` pokes it and checks again after a short delay.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Body text the service reports at its root when it is up
pub const RUNNING_STATUS: &str = "API is running";

/// Availability of the processing service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiStatus {
    Online,
    Offline,
    /// A wake request is outstanding
    Booting,
}

impl ApiStatus {
    /// Short label for the status line
    pub fn label(&self) -> &'static str {
        match self {
            ApiStatus::Online => "API ready",
            ApiStatus::Booting => "Waking up...",
            ApiStatus::Offline => "Sleeping (click to wake)",
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Checks and wakes the processing service
#[derive(Debug, Clone)]
pub struct StatusProbe {
    base_url: String,
    probe_client: Client,
    wake_client: Client,
    recheck_delay: Duration,
}

impl StatusProbe {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let probe_client = Client::builder().timeout(config.health_timeout()).build()?;
        // Waking can take as long as a cold start, so no timeout here
        let wake_client = Client::builder().build()?;

        Ok(Self {
            base_url: config.base_url(),
            probe_client,
            wake_client,
            recheck_delay: config.wake_recheck_delay(),
        })
    }

    /// One quick probe. Any failure reads as `Offline`.
    #[instrument(skip(self), fields(url = %self.base_url))]
    pub async fn check(&self) -> ApiStatus {
        let response = match self.probe_client.get(&self.base_url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Status probe failed");
                return ApiStatus::Offline;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Status probe got non-success reply");
            return ApiStatus::Offline;
        }

        match response.json::<Value>().await {
            Ok(body) if body.get("status").and_then(Value::as_str) == Some(RUNNING_STATUS) => {
                ApiStatus::Online
            }
            Ok(body) => {
                debug!(body = %body, "Unexpected status body");
                ApiStatus::Offline
            }
            Err(e) => {
                debug!(error = %e, "Status body was not JSON");
                ApiStatus::Offline
            }
        }
    }

    /// Poke the service, wait, then probe again.
    ///
    /// `on_booting` runs once the wake request has been answered, before the wait.
    #[instrument(skip(self, on_booting), fields(url = %self.base_url))]
    pub async fn wake<F>(&self, on_booting: F) -> ApiStatus
    where
        F: FnOnce(ApiStatus),
    {
        info!("Waking processing service");
        if let Err(e) = self.wake_client.get(&self.base_url).send().await {
            warn!(error = %e, "Wake request failed");
            return ApiStatus::Offline;
        }

        on_booting(ApiStatus::Booting);
        tokio::time::sleep(self.recheck_delay).await;

        let status = self.check().await;
        info!(status = %status, "Processing service status after wake");
        status
    }
}
