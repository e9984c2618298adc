//! CLI command implementations.

pub mod status;
pub mod submit;
pub mod wake;

use clap::Args;
use std::path::PathBuf;

use meet_core::{FieldUpdate, ResultsFile, Season, Timing};

/// Arguments for the submit command.
#[derive(Args, Debug, Default)]
pub struct SubmitArgs {
    /// Results file to upload.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Meet date, e.g. 2024-04-13.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Edition of the meet, e.g. 12th.
    #[arg(short, long)]
    pub edition: Option<String>,

    /// Meet name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Meet location.
    #[arg(short, long)]
    pub location: Option<String>,

    /// Season: Indoor or Outdoor.
    #[arg(short, long, default_value_t = Season::Indoor)]
    pub season: Season,

    /// Link to the published results.
    #[arg(short, long)]
    pub url: Option<String>,

    /// Timing: Hand-timed or FAT-timed.
    #[arg(short, long, default_value_t = Timing::HandTimed)]
    pub timing: Timing,

    /// Directory returned files are saved to (default: DOWNLOAD_DIR or current directory).
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Wake the service before submitting.
    #[arg(long)]
    pub wake: bool,
}

impl SubmitArgs {
    /// Field updates for everything given on the command line
    pub fn field_updates(&self) -> anyhow::Result<Vec<FieldUpdate>> {
        let mut updates = Vec::new();

        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        updates.push(FieldUpdate::MeetDate(text(&self.date)));
        updates.push(FieldUpdate::Edition(text(&self.edition)));
        updates.push(FieldUpdate::MeetName(text(&self.name)));
        updates.push(FieldUpdate::MeetLocation(text(&self.location)));
        updates.push(FieldUpdate::Season(self.season));
        updates.push(FieldUpdate::Url(text(&self.url)));
        updates.push(FieldUpdate::Timing(self.timing));

        let file = match &self.file {
            Some(path) => Some(ResultsFile::from_path(path).map_err(|e| {
                anyhow::anyhow!("Could not read results file {}: {}", path.display(), e)
            })?),
            None => None,
        };
        updates.push(FieldUpdate::ResultsFile(file));

        Ok(updates)
    }
}

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Arguments for the wake command.
#[derive(Args, Debug)]
pub struct WakeArgs {}
