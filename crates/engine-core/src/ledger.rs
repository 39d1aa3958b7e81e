use crate::error::LedgerError;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

const SEPARATOR: char = ',';

/// Durable record of the source paths optimized during the current run.
///
/// The ledger outlives the in-memory iteration state: the optimize pass
/// appends to it as items succeed, and the later, independently-invoked
/// relocate pass reads it back. The on-disk format is the source paths
/// joined by `,` with a trailing separator after the final entry.
///
/// Appends are deliberately small synchronous writes so they never hold up
/// the dispatch of further remote calls; the caller logs append failures
/// instead of treating them as fatal.
pub struct SuccessLedger {
    path: PathBuf,
}

impl SuccessLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncates the ledger. Called once at the start of an optimize run,
    /// never during a relocate pass.
    pub fn reset(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, "").map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn append(&self, source: &Path) -> Result<(), LedgerError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LedgerError::Io {
                path: self.path.clone(),
                source,
            })?;

        write!(file, "{}{SEPARATOR}", source.display()).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Parses the separator-joined sequence back into an ordered list,
    /// dropping the empty token left by the trailing separator.
    pub fn read_all(&self) -> Result<Vec<PathBuf>, LedgerError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(contents
            .split(SEPARATOR)
            .filter(|token| !token.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_are_read_back_in_order() {
        let dir = tempdir().unwrap();
        let ledger = SuccessLedger::new(dir.path().join("optimized.list"));
        ledger.reset().unwrap();

        ledger.append(Path::new("/photos/a.jpg")).unwrap();
        ledger.append(Path::new("/photos/b.png")).unwrap();

        let entries = ledger.read_all().unwrap();
        assert_eq!(
            entries,
            vec![PathBuf::from("/photos/a.jpg"), PathBuf::from("/photos/b.png")]
        );
    }

    #[test]
    fn on_disk_format_has_a_trailing_separator() {
        let dir = tempdir().unwrap();
        let ledger = SuccessLedger::new(dir.path().join("optimized.list"));
        ledger.reset().unwrap();

        ledger.append(Path::new("/photos/a.jpg")).unwrap();
        ledger.append(Path::new("/photos/b.png")).unwrap();

        let raw = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(raw, "/photos/a.jpg,/photos/b.png,");
    }

    #[test]
    fn reset_truncates_previous_run() {
        let dir = tempdir().unwrap();
        let ledger = SuccessLedger::new(dir.path().join("optimized.list"));
        ledger.reset().unwrap();
        ledger.append(Path::new("/photos/old.jpg")).unwrap();

        ledger.reset().unwrap();
        assert!(ledger.read_all().unwrap().is_empty());
    }

    #[test]
    fn reset_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let ledger = SuccessLedger::new(dir.path().join("state/nested/optimized.list"));
        ledger.reset().unwrap();
        assert!(ledger.path().exists());
    }

    #[test]
    fn reading_a_missing_ledger_is_an_error() {
        let dir = tempdir().unwrap();
        let ledger = SuccessLedger::new(dir.path().join("absent.list"));
        assert!(ledger.read_all().is_err());
    }
}
