use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FailureLogError {
    #[error("failure log write failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum QuarantineError {
    #[error("item {path} lies outside the scanned root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("failed to relocate {path}: {source}")]
    Relocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
