use crate::{error::QuarantineError, faillog::FailureLog};
use futures::future::join_all;
use model::item::WorkItem;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Relocates items that failed to settle within an iteration deadline so
/// the run can proceed without them.
///
/// Each item is moved (not copied) under the quarantine root, mirroring its
/// path relative to the scanned root, and one "not optimized" line is
/// appended to the failure log. Items are independent: a relocation error
/// is logged and the remaining items are still attempted. The caller only
/// advances once every handed-off item has been attempted.
pub struct QuarantineManager {
    source_root: PathBuf,
    quarantine_root: PathBuf,
    log: FailureLog,
}

impl QuarantineManager {
    pub fn new(
        source_root: impl Into<PathBuf>,
        quarantine_root: impl Into<PathBuf>,
        log: FailureLog,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            quarantine_root: quarantine_root.into(),
            log,
        }
    }

    /// Attempts to quarantine every item in the set, returning how many
    /// were actually relocated.
    pub async fn quarantine_all(&self, items: Vec<WorkItem>) -> usize {
        let attempts = join_all(items.iter().map(|item| self.quarantine_one(item))).await;

        let mut relocated = 0;
        for (item, attempt) in items.iter().zip(attempts) {
            match attempt {
                Ok(target) => {
                    relocated += 1;
                    info!(
                        source = %item.source.display(),
                        target = %target.display(),
                        "quarantined stalled item"
                    );
                    self.log_entry(&format!(
                        "{} not optimized within the iteration deadline; moved to {}",
                        item.source.display(),
                        target.display()
                    ));
                }
                Err(err) => {
                    error!(
                        source = %item.source.display(),
                        error = %err,
                        "failed to quarantine stalled item"
                    );
                    self.log_entry(&format!(
                        "{} not optimized within the iteration deadline; quarantine failed: {err}",
                        item.source.display()
                    ));
                }
            }
        }
        relocated
    }

    async fn quarantine_one(&self, item: &WorkItem) -> Result<PathBuf, QuarantineError> {
        let relative = item.source.strip_prefix(&self.source_root).map_err(|_| {
            QuarantineError::OutsideRoot {
                path: item.source.clone(),
                root: self.source_root.clone(),
            }
        })?;
        let target = self.quarantine_root.join(relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| QuarantineError::Relocation {
                    path: item.source.clone(),
                    source,
                })?;
        }

        tokio::fs::rename(&item.source, &target)
            .await
            .map_err(|source| QuarantineError::Relocation {
                path: item.source.clone(),
                source,
            })?;

        Ok(target)
    }

    fn log_entry(&self, message: &str) {
        if let Err(err) = self.log.append(message) {
            warn!(error = %err, "failed to append to the failure log");
        }
    }
}
