//! Runs the external results parser

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{ServerError, ServerResult};

/// Meet metadata passed to the parser next to the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetMetadata {
    pub meet_date: String,
    pub edition: String,
    pub meet_name: String,
    pub meet_location: String,
    pub season: String,
    pub url: String,
    pub timing: String,
}

impl MeetMetadata {
    /// Command-line arguments for the parser, after `--file`
    pub fn to_args(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("--date", self.meet_date.as_str()),
            ("--edition", self.edition.as_str()),
            ("--name", self.meet_name.as_str()),
            ("--location", self.meet_location.as_str()),
            ("--season", self.season.as_str()),
            ("--url", self.url.as_str()),
            ("--timing", self.timing.as_str()),
        ]
    }
}

/// What the parser left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Exit code, `None` if killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    /// Clean exit with nothing on stderr
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && self.stderr.trim().is_empty()
    }
}

/// Anything that can parse a staged results file
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, file: &Path, metadata: &MeetMetadata) -> ServerResult<ScriptOutput>;
}

/// Spawns `<interpreter> <script> --file <path> ...` as a child process
#[derive(Debug, Clone)]
pub struct ProcessScriptRunner {
    interpreter: String,
    script: PathBuf,
}

impl ProcessScriptRunner {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    fn command(&self, file: &Path, metadata: &MeetMetadata) -> Command {
        let mut command = Command::new(&self.interpreter);
        command.arg(&self.script).arg("--file").arg(file);
        for (flag, value) in metadata.to_args() {
            command.arg(flag).arg(value);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ScriptRunner for ProcessScriptRunner {
    #[instrument(skip(self, metadata), fields(script = %self.script.display()))]
    async fn run(&self, file: &Path, metadata: &MeetMetadata) -> ServerResult<ScriptOutput> {
        let output = self
            .command(file, metadata)
            .output()
            .await
            .map_err(|e| {
                ServerError::ScriptError(format!("could not start {}: {}", self.interpreter, e))
            })?;

        let result = ScriptOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "Parser finished"
        );
        Ok(result)
    }
}
