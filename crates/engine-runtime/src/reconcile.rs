use crate::{
    driver::{BatchDriver, Completion, DriverConfig, FailureMode},
    error::{ReconcileError, RelocationError},
    paths,
};
use engine_core::{ledger::SuccessLedger, metrics::Metrics};
use model::{item::WorkItem, settings::ReconcilerSettings};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReconcileSummary {
    pub entries: usize,
    pub batches: usize,
    pub moved: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// The relocate pass: reads the ledger left by an optimize run and moves
/// every named file into the output directory, preserving the structure
/// relative to the run root.
///
/// Same bounded-batch, poll-until-settled shape as the optimize pass, but
/// with a retry-free workload: there is no deadline and no quarantine. A
/// move that fails settles its item (logged and skipped), so a permanently
/// failing file cannot hold a batch open.
pub struct MoveReconciler {
    root: PathBuf,
    output_dir: PathBuf,
    settings: ReconcilerSettings,
    metrics: Metrics,
}

impl MoveReconciler {
    pub fn new(
        root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            root: root.into(),
            output_dir: output_dir.into(),
            settings,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.clone()
    }

    pub async fn execute(&self) -> Result<ReconcileSummary, ReconcileError> {
        // Checked before any move is attempted: a bad output directory is
        // fatal to this pass, not degraded.
        if !self.output_dir.is_dir() {
            return Err(ReconcileError::ConfigurationInvalid(self.output_dir.clone()));
        }

        let ledger = SuccessLedger::new(paths::ledger_path(&self.root));
        let sources = ledger.read_all()?;
        let entries = sources.len();
        info!(
            entries,
            output = %self.output_dir.display(),
            "relocating optimized files"
        );

        let mut worklist = Vec::with_capacity(entries);
        let mut skipped = 0usize;
        for source in sources {
            match source.strip_prefix(&self.root) {
                Ok(relative) => {
                    let destination = self.output_dir.join(relative);
                    worklist.push(WorkItem::new(source, destination));
                }
                Err(_) => {
                    skipped += 1;
                    warn!(
                        source = %source.display(),
                        root = %self.root.display(),
                        "ledger entry lies outside the run root; skipping"
                    );
                }
            }
        }

        let driver = BatchDriver::new(DriverConfig {
            batch_size: self.settings.batch_size,
            check_interval: self.settings.poll_interval,
            deadline: None,
            failure_mode: FailureMode::Settle,
        });

        let op = |item: WorkItem| async move {
            match tokio::fs::rename(&item.source, &item.destination).await {
                Ok(()) => (item, Ok(())),
                Err(source) => {
                    let path = item.source.clone();
                    (item, Err(RelocationError { path, source }))
                }
            }
        };

        let metrics = self.metrics.clone();
        let observe = |completion: Completion<'_, RelocationError>| {
            metrics.increment_processed(1);
            match completion.result {
                Ok(()) => {
                    metrics.increment_succeeded(1);
                    info!(
                        processed = completion.processed,
                        total = completion.total,
                        from = %completion.item.source.display(),
                        to = %completion.item.destination.display(),
                        "relocated"
                    );
                }
                Err(err) => {
                    metrics.increment_failed(1);
                    warn!(error = %err, "relocation failed; leaving the file in place");
                }
            }
        };

        let report = driver.drain(worklist, None, op, observe).await;
        self.metrics.increment_batches(report.iterations as u64);

        let summary = ReconcileSummary {
            entries,
            batches: report.iterations,
            moved: report.succeeded,
            failed: report.failed,
            skipped,
        };
        info!(
            batches = summary.batches,
            moved = summary.moved,
            failed = summary.failed,
            "relocation complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{path::Path, time::Duration};
    use tempfile::tempdir;
    use tokio::time::timeout;

    fn settings(batch_size: usize) -> ReconcilerSettings {
        ReconcilerSettings {
            batch_size,
            poll_interval: Duration::from_millis(10),
        }
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"optimized bytes").unwrap();
    }

    fn record(root: &Path, sources: &[&Path]) {
        let ledger = SuccessLedger::new(paths::ledger_path(root));
        ledger.reset().unwrap();
        for source in sources {
            ledger.append(source).unwrap();
        }
    }

    #[tokio::test]
    async fn moves_ledger_entries_preserving_relative_structure() {
        let root = tempdir().unwrap();
        let out = tempdir().unwrap();
        let x = root.path().join("x.jpg");
        let y = root.path().join("albums/y.jpg");
        touch(&x);
        touch(&y);
        record(root.path(), &[&x, &y]);

        let reconciler = MoveReconciler::new(root.path(), out.path(), settings(50));
        let summary = reconciler.execute().await.unwrap();

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.moved, 2);
        assert_eq!(summary.failed, 0);
        assert!(out.path().join("x.jpg").exists());
        assert!(out.path().join("albums/y.jpg").exists());
        assert!(!x.exists(), "files are moved, not copied");
        assert!(!y.exists());
    }

    #[tokio::test]
    async fn an_output_path_that_is_a_file_is_rejected_before_any_move() {
        let root = tempdir().unwrap();
        let x = root.path().join("x.jpg");
        touch(&x);
        record(root.path(), &[&x]);

        let not_a_dir = root.path().join("out.txt");
        std::fs::write(&not_a_dir, b"plain file").unwrap();

        let reconciler = MoveReconciler::new(root.path(), &not_a_dir, settings(50));
        let err = reconciler.execute().await.unwrap_err();

        assert!(matches!(err, ReconcileError::ConfigurationInvalid(_)));
        assert!(x.exists(), "no move may be attempted");
    }

    #[tokio::test]
    async fn already_moved_files_are_logged_and_do_not_abort_the_batch() {
        let root = tempdir().unwrap();
        let out = tempdir().unwrap();
        let gone = root.path().join("gone.jpg");
        let present = root.path().join("present.jpg");
        touch(&present);
        record(root.path(), &[&gone, &present]);

        let reconciler = MoveReconciler::new(root.path(), out.path(), settings(50));
        let summary = timeout(Duration::from_secs(5), reconciler.execute())
            .await
            .expect("a failing move must not stall the reconciler")
            .unwrap();

        assert_eq!(summary.moved, 1);
        assert_eq!(summary.failed, 1);
        assert!(out.path().join("present.jpg").exists());
    }

    #[tokio::test]
    async fn batches_are_bounded_by_the_reconciler_batch_size() {
        let root = tempdir().unwrap();
        let out = tempdir().unwrap();
        let a = root.path().join("a.jpg");
        let b = root.path().join("b.jpg");
        let c = root.path().join("c.jpg");
        touch(&a);
        touch(&b);
        touch(&c);
        record(root.path(), &[&a, &b, &c]);

        let reconciler = MoveReconciler::new(root.path(), out.path(), settings(2));
        let summary = reconciler.execute().await.unwrap();

        assert_eq!(summary.batches, 2);
        assert_eq!(summary.moved, 3);
    }

    #[tokio::test]
    async fn ledger_entries_outside_the_root_are_skipped() {
        let root = tempdir().unwrap();
        let out = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let stray = elsewhere.path().join("stray.jpg");
        let ours = root.path().join("ours.jpg");
        touch(&stray);
        touch(&ours);
        record(root.path(), &[&stray, &ours]);

        let reconciler = MoveReconciler::new(root.path(), out.path(), settings(50));
        let summary = reconciler.execute().await.unwrap();

        assert_eq!(summary.moved, 1);
        assert_eq!(summary.skipped, 1);
        assert!(stray.exists());
    }
}
