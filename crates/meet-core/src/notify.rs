//! User-facing notifications raised by the submission lifecycle.

use tracing::{info, warn};

/// Shown after the processing service accepted the submission
pub const SUCCESS_MESSAGE: &str = "Meet data successfully submitted and processed!";

/// Shown after any failed attempt
pub const FAILURE_MESSAGE: &str = "Error submitting meet data. Please try again.";

/// A blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The attempt succeeded
    Submitted,
    /// The attempt failed; `detail` is the underlying error text
    Failed { detail: String },
}

impl Notice {
    /// Text to show
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Submitted => SUCCESS_MESSAGE,
            Notice::Failed { .. } => FAILURE_MESSAGE,
        }
    }
}

/// Delivers notices to whoever is watching the form
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Writes notices to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice {
            Notice::Submitted => info!("{}", notice.message()),
            Notice::Failed { detail } => warn!(detail = %detail, "{}", notice.message()),
        }
    }
}
