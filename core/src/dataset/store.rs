use super::{local_time, SurveyDataset};
use crate::prelude::SurveyResult;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one JSON file per finished or cancelled scan into a folder.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    folder: PathBuf,
}

impl DatasetStore {
    pub fn new<P: Into<PathBuf>>(folder: P) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Saves under a local-time file name, adding a numeric suffix when a
    /// scan from the same second already exists.
    pub fn save(&self, dataset: &SurveyDataset) -> SurveyResult<PathBuf> {
        fs::create_dir_all(&self.folder)?;
        let stem = Local::now().format(local_time::FORMAT).to_string();
        let mut path = self.folder.join(format!("{stem}.json"));
        let mut suffix = 1;
        while path.exists() {
            path = self.folder.join(format!("{stem}_{suffix}.json"));
            suffix += 1;
        }
        let encoded = serde_json::to_vec_pretty(dataset)?;
        fs::write(&path, encoded)?;
        log::info!(
            "saved {} readings to {}",
            dataset.measurements.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> SurveyResult<SurveyDataset> {
        let contents = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&contents)?)
    }
}
