use std::fs;
use std::path::{Path, PathBuf};

use dotex_experiment::{StatisticsUploader, UploadError};
use tracing::info;

/// Writes each statistics upload to `<dir>/experiment_<metadata>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirUploader {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonDirUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl StatisticsUploader for JsonDirUploader {
    fn upload_statistics(&mut self, metadata: &str, statistics: &str) -> Result<(), UploadError> {
        if metadata.is_empty() || metadata.contains(['/', '\\']) {
            return Err(UploadError::Transport(format!("unusable metadata {metadata:?}")));
        }
        // reject payloads that would not read back
        let value: serde_json::Value = serde_json::from_str(statistics)?;
        let path = self.dir.join(format!("experiment_{metadata}.json"));
        fs::write(&path, serde_json::to_string_pretty(&value)?)?;
        info!(path = %path.display(), "statistics written");
        self.written.push(path);
        Ok(())
    }
}
