use async_trait::async_trait;
use model::item::{WorkItem, WorkStatus};
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    path::PathBuf,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};
use tracing::{debug, warn};

/// What to do with an item whose operation reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Keep the item outstanding. It can only settle via the iteration
    /// deadline, which hands it to the stall handler (optimize pass).
    Retain,
    /// Count the failure as settled so the batch can complete without it
    /// (relocate pass). A permanently failing item cannot stall the run.
    Settle,
}

/// `Retain` without a `deadline` would spin forever on the first failure,
/// so every `Retain` configuration must carry one.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub batch_size: usize,
    pub check_interval: Duration,
    pub deadline: Option<Duration>,
    pub failure_mode: FailureMode,
}

/// Receives the items still outstanding when an iteration deadline expires.
/// The driver waits for `handle` to finish before starting the next
/// iteration.
#[async_trait]
pub trait StallHandler: Send + Sync {
    async fn handle(&self, stalled: Vec<WorkItem>);
}

/// One observed completion, in arrival order. `processed` counts
/// completions (successes and failures alike) across the whole run.
pub struct Completion<'a, E> {
    pub item: &'a WorkItem,
    pub result: &'a Result<(), E>,
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DrainReport {
    pub iterations: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub stalled: usize,
}

#[derive(Debug, Default)]
struct IterationOutcome {
    succeeded: usize,
    failed: usize,
    stalled: usize,
}

/// The bounded-batch settle-or-timeout-or-poll primitive.
///
/// Both passes are instances of the same loop: take up to `batch_size`
/// items off the front of the worklist, dispatch the per-item operation for
/// each concurrently, then poll every `check_interval` until the batch has
/// settled. Completions mutate iteration state as they arrive; the decision
/// to advance (or to hand stragglers to the stall handler once the deadline
/// has passed) is made only at poll ticks. That gives every iteration a
/// latency floor of one `check_interval`, a deliberate trade of latency for
/// a simple, predictable loop.
///
/// Iterations are strictly sequential: no dispatch for iteration N+1 occurs
/// before iteration N has fully settled.
pub struct BatchDriver {
    config: DriverConfig,
}

impl BatchDriver {
    pub fn new(config: DriverConfig) -> Self {
        let config = DriverConfig {
            batch_size: config.batch_size.max(1),
            ..config
        };
        Self { config }
    }

    pub async fn drain<Op, Fut, E, Obs>(
        &self,
        worklist: Vec<WorkItem>,
        stall: Option<&dyn StallHandler>,
        op: Op,
        mut observe: Obs,
    ) -> DrainReport
    where
        Op: Fn(WorkItem) -> Fut,
        Fut: Future<Output = (WorkItem, Result<(), E>)> + Send + 'static,
        E: Send + 'static,
        Obs: FnMut(Completion<'_, E>),
    {
        let total = worklist.len();
        let mut pending: VecDeque<WorkItem> = worklist.into();
        let mut processed = 0usize;
        let mut report = DrainReport::default();

        while !pending.is_empty() {
            let take = self.config.batch_size.min(pending.len());
            let batch: Vec<WorkItem> = pending.drain(..take).collect();
            report.iterations += 1;
            debug!(
                iteration = report.iterations,
                size = batch.len(),
                remaining = pending.len(),
                "dispatching batch"
            );

            let outcome = self
                .run_iteration(batch, total, &mut processed, stall, &op, &mut observe)
                .await;
            report.succeeded += outcome.succeeded;
            report.failed += outcome.failed;
            report.stalled += outcome.stalled;
        }

        report
    }

    /// Dispatches one batch and blocks (via polling) until it settles or
    /// the deadline forces progress. All iteration state is local to this
    /// call; the returned outcome is the only thing that escapes.
    async fn run_iteration<Op, Fut, E, Obs>(
        &self,
        batch: Vec<WorkItem>,
        total: usize,
        processed: &mut usize,
        stall: Option<&dyn StallHandler>,
        op: &Op,
        observe: &mut Obs,
    ) -> IterationOutcome
    where
        Op: Fn(WorkItem) -> Fut,
        Fut: Future<Output = (WorkItem, Result<(), E>)> + Send + 'static,
        E: Send + 'static,
        Obs: FnMut(Completion<'_, E>),
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<(WorkItem, Result<(), E>)>();
        let mut outstanding: HashMap<PathBuf, WorkItem> = HashMap::with_capacity(batch.len());

        for mut item in batch {
            if let Some(parent) = item.destination.parent() {
                if let Err(err) = tokio::fs::create_dir_all(parent).await {
                    warn!(
                        destination = %item.destination.display(),
                        error = %err,
                        "could not prepare destination directory"
                    );
                }
            }

            item.status = WorkStatus::InFlight;
            outstanding.insert(item.source.clone(), item.clone());

            let fut = op(item);
            let tx = tx.clone();
            tokio::spawn(async move {
                // The receiver is gone once the iteration has been forced
                // past the deadline; a late completion is then dropped.
                let _ = tx.send(fut.await);
            });
        }
        drop(tx);

        let started = Instant::now();
        let mut poll = time::interval_at(
            started + self.config.check_interval,
            self.config.check_interval,
        );
        let mut outcome = IterationOutcome::default();

        loop {
            tokio::select! {
                Some((mut item, result)) = rx.recv() => {
                    *processed += 1;
                    match &result {
                        Ok(()) => {
                            item.status = WorkStatus::Succeeded;
                            outstanding.remove(&item.source);
                            outcome.succeeded += 1;
                        }
                        Err(_) => {
                            item.status = WorkStatus::Failed;
                            outcome.failed += 1;
                            match self.config.failure_mode {
                                FailureMode::Settle => {
                                    outstanding.remove(&item.source);
                                }
                                FailureMode::Retain => {
                                    if let Some(held) = outstanding.get_mut(&item.source) {
                                        held.status = WorkStatus::Failed;
                                    }
                                }
                            }
                        }
                    }
                    observe(Completion {
                        item: &item,
                        result: &result,
                        processed: *processed,
                        total,
                    });
                }
                _ = poll.tick() => {
                    if outstanding.is_empty() {
                        break;
                    }
                    if let Some(deadline) = self.config.deadline
                        && started.elapsed() > deadline
                    {
                        let stragglers: Vec<WorkItem> =
                            outstanding.drain().map(|(_, item)| item).collect();
                        outcome.stalled = stragglers.len();
                        match stall {
                            Some(handler) => handler.handle(stragglers).await,
                            None => {
                                for item in &stragglers {
                                    warn!(
                                        source = %item.source.display(),
                                        "unsettled at deadline with no stall handler; dropping"
                                    );
                                }
                            }
                        }
                        break;
                    }
                }
            }
        }

        outcome
    }
}
