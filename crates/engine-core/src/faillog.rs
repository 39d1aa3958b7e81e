use crate::error::FailureLogError;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Append-only, line-oriented log of items that were not optimized,
/// intended for later manual triage. Every line is prefixed with a
/// human-readable UTC timestamp.
#[derive(Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &str) -> Result<(), FailureLogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| FailureLogError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| FailureLogError::Io {
                path: self.path.clone(),
                source,
            })?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        writeln!(file, "{timestamp} {message}").map_err(|source| FailureLogError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn entries_are_timestamped_lines() {
        let dir = tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("not-optimized.log"));

        log.append("a.jpg not optimized").unwrap();
        log.append("b.png not optimized").unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a.jpg not optimized"));
        assert!(lines[0].contains("UTC"));
    }

    #[test]
    fn append_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("state/not-optimized.log"));
        log.append("entry").unwrap();
        assert!(log.path().exists());
    }
}
