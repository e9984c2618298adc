//! Output formatting for the CLI.

use serde_json::Value;
use tracing::warn;

use meet_core::{Notice, Notifier, TracingNotifier};

/// Output handler for CLI messages.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("  {}", msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("✓ {}", msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("✗ {}", msg);
    }

    /// Print a JSON value, pretty unless JSON output was requested.
    pub fn json(&self, value: &Value) {
        if self.json {
            println!("{}", value);
        } else {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            );
        }
    }
}

/// Notifier for the output mode. JSON mode keeps stdout for the result
/// and sends notices to the log on stderr.
pub fn notifier_for(output: Output) -> Box<dyn Notifier> {
    if output.is_json() {
        Box::new(TracingNotifier)
    } else {
        Box::new(ConsoleNotifier::new(output))
    }
}

/// Shows submission notices on the terminal
pub struct ConsoleNotifier {
    output: Output,
}

impl ConsoleNotifier {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        match notice {
            Notice::Submitted => self.output.success(notice.message()),
            Notice::Failed { detail } => {
                warn!(detail = %detail, "Submission failed");
                self.output.error(notice.message());
            }
        }
    }
}
