use engine_core::error::LedgerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorklistError {
    #[error("failed to scan {root}: {source}")]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("output path {0} is not a directory")]
    ConfigurationInvalid(PathBuf),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A file move that did not complete, during reconciliation.
#[derive(Error, Debug)]
#[error("failed to relocate {path}: {source}")]
pub struct RelocationError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
