use connectors::OptimizeError;
use engine_runtime::error::{ReconcileError, RunError, WorklistError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to resolve the working directory: {0}")]
    CurrentDir(#[from] std::io::Error),

    #[error("root {root} is not usable: {source}")]
    InvalidRoot {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build the worklist: {0}")]
    Worklist(#[from] WorklistError),

    #[error("optimize run failed: {0}")]
    Run(#[from] RunError),

    #[error("relocation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("service request failed: {0}")]
    Service(#[from] OptimizeError),

    #[error("failed to serialize the summary: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
