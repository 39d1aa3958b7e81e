use crate::{
    driver::{BatchDriver, Completion, DriverConfig, FailureMode, StallHandler},
    error::RunError,
    paths,
};
use async_trait::async_trait;
use connectors::{OptimizeError, Optimizer};
use engine_core::{
    faillog::FailureLog, ledger::SuccessLedger, metrics::Metrics, quarantine::QuarantineManager,
};
use model::{item::WorkItem, settings::EngineSettings};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc, time::Instant};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunSummary {
    pub items: usize,
    pub iterations: usize,
    pub optimized: usize,
    pub failed: usize,
    pub quarantined: usize,
}

#[async_trait]
impl StallHandler for QuarantineManager {
    async fn handle(&self, stalled: Vec<WorkItem>) {
        self.quarantine_all(stalled).await;
    }
}

/// The optimize pass: drains the worklist through the remote optimizer in
/// bounded batches, appends each success to the ledger, and quarantines
/// items that fail to settle within the iteration deadline.
pub struct OptimizeRun {
    root: PathBuf,
    optimizer: Arc<dyn Optimizer>,
    settings: EngineSettings,
    metrics: Metrics,
}

impl OptimizeRun {
    pub fn new(
        root: impl Into<PathBuf>,
        optimizer: Arc<dyn Optimizer>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            root: root.into(),
            optimizer,
            settings,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.clone()
    }

    pub async fn execute(&self, worklist: Vec<WorkItem>) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let total = worklist.len();
        info!(items = total, root = %self.root.display(), "starting optimize run");

        // This run's ledger reflects only this run's successes.
        let ledger = SuccessLedger::new(paths::ledger_path(&self.root));
        ledger.reset()?;

        let quarantine = QuarantineManager::new(
            self.root.clone(),
            paths::quarantine_root(&self.root),
            FailureLog::new(paths::failure_log_path(&self.root)),
        );

        let driver = BatchDriver::new(DriverConfig {
            batch_size: self.settings.batch_size,
            check_interval: self.settings.check_interval,
            deadline: Some(self.settings.iteration_deadline),
            failure_mode: FailureMode::Retain,
        });

        let optimizer = self.optimizer.clone();
        let op = move |item: WorkItem| {
            let optimizer = optimizer.clone();
            async move {
                let result = optimizer.optimize(&item.source, &item.destination).await;
                (item, result)
            }
        };

        let metrics = self.metrics.clone();
        let observe = |completion: Completion<'_, OptimizeError>| {
            metrics.increment_processed(1);
            match completion.result {
                Ok(()) => {
                    metrics.increment_succeeded(1);
                    if let Err(err) = ledger.append(&completion.item.source) {
                        warn!(
                            source = %completion.item.source.display(),
                            error = %err,
                            "optimized but not recorded; the relocate pass will skip this file"
                        );
                    }
                    info!(
                        processed = completion.processed,
                        total = completion.total,
                        source = %completion.item.source.display(),
                        "optimized"
                    );
                }
                Err(err) => {
                    metrics.increment_failed(1);
                    error!(
                        processed = completion.processed,
                        total = completion.total,
                        source = %completion.item.source.display(),
                        category = err.category(),
                        error = %err,
                        "optimization failed"
                    );
                }
            }
        };

        let report = driver.drain(worklist, Some(&quarantine), op, observe).await;

        self.metrics.increment_batches(report.iterations as u64);
        self.metrics.increment_quarantined(report.stalled as u64);

        let summary = RunSummary {
            items: total,
            iterations: report.iterations,
            optimized: report.succeeded,
            failed: report.failed,
            quarantined: report.stalled,
        };
        info!(
            iterations = summary.iterations,
            optimized = summary.optimized,
            quarantined = summary.quarantined,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "optimize run complete"
        );
        Ok(summary)
    }
}
