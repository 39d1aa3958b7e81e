use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    items_processed: AtomicU64,
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
    items_quarantined: AtomicU64,
    batches_processed: AtomicU64,
}

/// Run-wide counters, cheap to clone and share across tasks.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    pub items_processed: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
    pub items_quarantined: u64,
    pub batches_processed: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_processed(&self, count: u64) {
        self.inner
            .items_processed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_succeeded(&self, count: u64) {
        self.inner
            .items_succeeded
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_failed(&self, count: u64) {
        self.inner.items_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_quarantined(&self, count: u64) {
        self.inner
            .items_quarantined
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_batches(&self, count: u64) {
        self.inner
            .batches_processed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_processed: self.inner.items_processed.load(Ordering::Relaxed),
            items_succeeded: self.inner.items_succeeded.load(Ordering::Relaxed),
            items_failed: self.inner.items_failed.load(Ordering::Relaxed),
            items_quarantined: self.inner.items_quarantined.load(Ordering::Relaxed),
            batches_processed: self.inner.batches_processed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
