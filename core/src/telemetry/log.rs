use chrono::Local;
use log::{error, info, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Routes messages to the `log` facade and, for errors, to an optional
/// append-only journal file that outlives the process.
#[derive(Debug, Clone)]
pub struct LogManager {
    journal: Option<PathBuf>,
}

impl LogManager {
    pub fn new() -> Self {
        Self { journal: None }
    }

    pub fn with_journal<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            journal: Some(path.into()),
        }
    }

    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_deref()
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn record_error(&self, message: &str) {
        error!("{}", message);
        if let Some(path) = &self.journal {
            if let Err(err) = append_line(path, message) {
                warn!("failed to write error journal {}: {}", path.display(), err);
            }
        }
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

fn append_line(path: &Path, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "{}: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_appended_to_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("errors.log");
        let logger = LogManager::with_journal(&path);
        logger.record("not journaled");
        logger.record_error("slew timeout at point 3");
        logger.record_error("capture failed");

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("slew timeout at point 3"));
        assert!(!contents.contains("not journaled"));
    }
}
