use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single file awaiting optimization or relocation.
///
/// Identity within a run is the `source` path. An item is owned exclusively
/// by the engine currently draining the worklist it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub status: WorkStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    Pending,
    InFlight,
    Succeeded,
    Failed,
}

impl WorkItem {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            status: WorkStatus::Pending,
        }
    }

    /// An item optimized in place: the destination is the source itself.
    pub fn in_place(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        Self {
            source: source.clone(),
            destination: source,
            status: WorkStatus::Pending,
        }
    }

}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkStatus::Pending => "Pending",
            WorkStatus::InFlight => "InFlight",
            WorkStatus::Succeeded => "Succeeded",
            WorkStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}
