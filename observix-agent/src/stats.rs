//! Per-pipeline statistics
//!
//! The stats block is the only state shared between a pipeline's three tasks:
//! atomic counters plus a mutex-guarded last_ok/last_err pair. Snapshots are
//! detached copies, not live handles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct PipelineStats {
    recv: AtomicU64,
    dropped_queue_full: AtomicU64,
    sent_events: AtomicU64,
    sent_batches: AtomicU64,
    failed_batches: AtomicU64,
    buffer: AtomicU64,
    observed: Mutex<Observed>,
}

#[derive(Debug, Default, Clone)]
struct Observed {
    last_ok: Option<DateTime<Utc>>,
    last_err: Option<LastError>,
}

/// Last non-empty error message with its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastError {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl PipelineStats {
    /// Reserve a queue slot. Called before the push so the dequeue-side
    /// decrement always pairs with a prior increment.
    pub fn record_enqueue(&self) {
        self.buffer.fetch_add(1, Ordering::Relaxed);
    }

    /// Source accepted an event into the queue.
    pub fn record_recv(&self) {
        self.recv.fetch_add(1, Ordering::Relaxed);
    }

    /// Source dropped the newest event because the queue was full.
    pub fn record_drop_queue_full(&self) {
        self.dropped_queue_full.fetch_add(1, Ordering::Relaxed);
        self.buffer.fetch_sub(1, Ordering::Relaxed);
    }

    /// Undo a reserved slot when the queue closed under the push.
    pub fn record_enqueue_abandoned(&self) {
        self.buffer.fetch_sub(1, Ordering::Relaxed);
    }

    /// Batcher pulled an event off the queue.
    pub fn record_dequeue(&self) {
        self.buffer.fetch_sub(1, Ordering::Relaxed);
    }

    /// Destination emitted `count` events.
    pub fn record_events_sent(&self, count: u64) {
        self.sent_events.fetch_add(count, Ordering::Relaxed);
    }

    /// A whole batch reached the destination without errors.
    pub fn record_batch_delivered(&self) {
        self.sent_batches.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut observed) = self.observed.lock() {
            observed.last_ok = Some(Utc::now());
        }
    }

    /// A batch hit an error (indexer or destination side).
    pub fn record_batch_failed(&self, message: &str) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut observed) = self.observed.lock() {
            observed.last_err = Some(LastError {
                at: Utc::now(),
                message: message.to_string(),
            });
        }
    }

    /// Detached snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let observed = self
            .observed
            .lock()
            .map(|observed| observed.clone())
            .unwrap_or_default();

        StatsSnapshot {
            recv: self.recv.load(Ordering::Relaxed),
            dropped_queue_full: self.dropped_queue_full.load(Ordering::Relaxed),
            sent_events: self.sent_events.load(Ordering::Relaxed),
            sent_batches: self.sent_batches.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            buffer: self.buffer.load(Ordering::Relaxed),
            last_ok: observed.last_ok,
            last_err: observed.last_err,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub recv: u64,
    pub dropped_queue_full: u64,
    pub sent_events: u64,
    pub sent_batches: u64,
    pub failed_batches: u64,
    pub buffer: u64,
    pub last_ok: Option<DateTime<Utc>>,
    pub last_err: Option<LastError>,
}

/// Registry of live pipeline stats, shared between the reconciler (writer)
/// and `AgentRuntime::stats()` (reader).
#[derive(Debug, Clone, Default)]
pub struct StatsRegistry {
    inner: Arc<Mutex<HashMap<Uuid, Arc<PipelineStats>>>>,
}

impl StatsRegistry {
    pub fn insert(&self, pipeline_id: Uuid, stats: Arc<PipelineStats>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.insert(pipeline_id, stats);
        }
    }

    pub fn remove(&self, pipeline_id: &Uuid) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.remove(pipeline_id);
        }
    }

    /// Snapshot every live pipeline's counters.
    pub fn snapshot_all(&self) -> HashMap<Uuid, StatsSnapshot> {
        match self.inner.lock() {
            Ok(inner) => inner
                .iter()
                .map(|(id, stats)| (*id, stats.snapshot()))
                .collect(),
            Err(_) => HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_into_snapshots() {
        let stats = PipelineStats::default();
        stats.record_enqueue();
        stats.record_recv();
        stats.record_enqueue();
        stats.record_recv();
        stats.record_dequeue();
        stats.record_enqueue();
        stats.record_drop_queue_full();
        stats.record_events_sent(1);
        stats.record_batch_delivered();
        stats.record_batch_failed("indexer unavailable");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.recv, 2);
        assert_eq!(snapshot.buffer, 1);
        assert_eq!(snapshot.dropped_queue_full, 1);
        assert_eq!(snapshot.sent_events, 1);
        assert_eq!(snapshot.sent_batches, 1);
        assert_eq!(snapshot.failed_batches, 1);
        assert!(snapshot.last_ok.is_some());
        assert_eq!(
            snapshot.last_err.unwrap().message,
            "indexer unavailable"
        );
    }

    #[test]
    fn registry_snapshots_are_detached() {
        let registry = StatsRegistry::default();
        let id = Uuid::new_v4();
        let stats = Arc::new(PipelineStats::default());
        registry.insert(id, stats.clone());

        let before = registry.snapshot_all();
        stats.record_recv();
        let after = registry.snapshot_all();

        assert_eq!(before[&id].recv, 0);
        assert_eq!(after[&id].recv, 1);

        registry.remove(&id);
        assert!(registry.snapshot_all().is_empty());
    }
}
