//! Saves offered files into a directory

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use meet_core::download::DEFAULT_FILE_NAME;
use meet_core::{CoreResult, DownloadReceipt, DownloadSink, DownloadedFile};

use crate::error::ClientError;

/// Writes every offered file into one directory, overwriting same-named files
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a file with this name ends up. Directory parts of the name are dropped.
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME);
        self.dir.join(name)
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn offer(&self, file: &DownloadedFile) -> CoreResult<DownloadReceipt> {
        let target = self.target_path(&file.file_name);

        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&target, &file.bytes))
            .map_err(|e| {
                ClientError::DownloadError(format!("could not write {}: {}", target.display(), e))
            })?;

        info!(path = %target.display(), size_bytes = file.bytes.len(), "Saved download");

        Ok(DownloadReceipt {
            file_name: file.file_name.clone(),
            size_bytes: file.bytes.len(),
            location: Some(target.display().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meet_core::CoreError;
    use pretty_assertions::assert_eq;

    fn csv(name: &str) -> DownloadedFile {
        DownloadedFile {
            file_name: name.to_string(),
            content_type: Some("text/csv".to_string()),
            bytes: b"Event,Place\n".to_vec(),
        }
    }

    #[test]
    fn test_saves_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectoryDownloadSink::new(dir.path().join("out"));

        let receipt = sink.offer(&csv("Spring_Classic_results.csv")).unwrap();

        let saved = dir.path().join("out").join("Spring_Classic_results.csv");
        assert_eq!(fs::read(&saved).unwrap(), b"Event,Place\n");
        assert_eq!(receipt.size_bytes, 12);
        assert_eq!(receipt.location, Some(saved.display().to_string()));
    }

    #[test]
    fn test_path_components_are_stripped() {
        let sink = DirectoryDownloadSink::new("/tmp/downloads");
        assert_eq!(
            sink.target_path("../../etc/passwd"),
            PathBuf::from("/tmp/downloads/passwd")
        );
        assert_eq!(sink.target_path(".."), PathBuf::from("/tmp/downloads/results.csv"));
    }

    #[test]
    fn test_unwritable_directory_reports_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let sink = DirectoryDownloadSink::new(blocker.join("sub"));

        let err = sink.offer(&csv("a.csv")).unwrap_err();
        assert!(matches!(err, CoreError::Download(_)));
    }
}
