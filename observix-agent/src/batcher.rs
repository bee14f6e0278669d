//! Batcher + processor task
//!
//! Drains the bounded queue into a batch buffer and flushes whenever the
//! buffer reaches `batch_max_events` or `batch_max_seconds` has elapsed since
//! the first event in the current buffer. Empty ticks never produce batches.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use observix_core::Event;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::processors::Processor;
use crate::stats::PipelineStats;

#[derive(Debug, Clone, Copy)]
pub struct BatcherConfig {
    pub batch_max_events: usize,
    pub batch_max_seconds: f64,
}

/// Annotations stamped onto every outgoing event's meta.
pub type Annotations = BTreeMap<String, serde_json::Value>;

pub async fn run(
    mut rx: mpsc::Receiver<Event>,
    processor: Processor,
    dest_tx: mpsc::Sender<Vec<Event>>,
    stats: Arc<PipelineStats>,
    config: BatcherConfig,
    annotations: Annotations,
) {
    let dwell = Duration::from_secs_f64(config.batch_max_seconds);
    let mut batch: Vec<Event> = Vec::new();
    let mut deadline: Option<Instant> = None;

    loop {
        // The sleep target only matters while a batch is dwelling; the
        // far-future fallback keeps the select arm well-formed when idle.
        let flush_at = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400));

        let flush_now = tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(event) => {
                    stats.record_dequeue();
                    if batch.is_empty() {
                        deadline = Some(Instant::now() + dwell);
                    }
                    batch.push(event);
                    batch.len() >= config.batch_max_events
                }
                None => {
                    // Source closed: flush the remainder and exit.
                    if !batch.is_empty() {
                        flush(std::mem::take(&mut batch), &processor, &dest_tx, &stats, &annotations)
                            .await;
                    }
                    break;
                }
            },
            _ = sleep_until(flush_at), if deadline.is_some() => true,
        };

        if flush_now && !batch.is_empty() {
            deadline = None;
            flush(std::mem::take(&mut batch), &processor, &dest_tx, &stats, &annotations).await;
        }
    }

    debug!("batcher stopped");
}

async fn flush(
    batch: Vec<Event>,
    processor: &Processor,
    dest_tx: &mpsc::Sender<Vec<Event>>,
    stats: &PipelineStats,
    annotations: &Annotations,
) {
    let mut processed = match processor.process(&batch).await {
        Ok(events) => events,
        Err(e) => {
            warn!("batch processing failed: {}", e);
            stats.record_batch_failed(&e.to_string());
            if !processor.fallback_to_raw() {
                return;
            }
            // The original raw lines stand in for the normalized documents.
            batch
        }
    };

    for event in &mut processed {
        for (key, value) in annotations {
            event.meta.insert(key.clone(), value.clone());
        }
    }

    // A closed hand-off channel means the destination is gone and the
    // pipeline is shutting down; the batch is lost, which is acceptable
    // under at-least-once semantics on best-effort sources.
    let _ = dest_tx.send(processed).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::Processor;

    fn test_config(max_events: usize, max_seconds: f64) -> BatcherConfig {
        BatcherConfig {
            batch_max_events: max_events,
            batch_max_seconds: max_seconds,
        }
    }

    fn spawn_batcher(
        config: BatcherConfig,
    ) -> (
        mpsc::Sender<Event>,
        mpsc::Receiver<Vec<Event>>,
        Arc<PipelineStats>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(100);
        let (batch_tx, batch_rx) = mpsc::channel(10);
        let stats = Arc::new(PipelineStats::default());
        tokio::spawn(run(
            event_rx,
            Processor::Raw,
            batch_tx,
            stats.clone(),
            config,
            Annotations::new(),
        ));
        (event_tx, batch_rx, stats)
    }

    #[tokio::test]
    async fn flushes_when_batch_is_full() {
        let (tx, mut rx, _stats) = spawn_batcher(test_config(2, 30.0));

        tx.send(Event::now("a")).await.unwrap();
        tx.send(Event::now("b")).await.unwrap();
        tx.send(Event::now("c")).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].raw, "a");
        assert_eq!(first[1].raw, "b");

        // "c" dwells until the timeout; with 30s max it must not flush yet.
        let pending = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn flushes_on_dwell_timeout() {
        let (tx, mut rx, _stats) = spawn_batcher(test_config(100, 0.2));

        tx.send(Event::now("solo")).await.unwrap();

        let batch = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].raw, "solo");
    }

    #[tokio::test]
    async fn quiet_periods_produce_no_batches() {
        let (_tx, mut rx, _stats) = spawn_batcher(test_config(10, 0.05));

        let nothing = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn remainder_is_flushed_when_source_closes() {
        let (tx, mut rx, _stats) = spawn_batcher(test_config(10, 30.0));

        tx.send(Event::now("tail")).await.unwrap();
        drop(tx);

        let batch = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].raw, "tail");

        // Channel closes after the final flush.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn annotations_are_stamped_on_outgoing_events() {
        let (event_tx, event_rx) = mpsc::channel(10);
        let (batch_tx, mut batch_rx) = mpsc::channel(10);
        let stats = Arc::new(PipelineStats::default());
        let mut annotations = Annotations::new();
        annotations.insert("agent_id".to_string(), serde_json::json!("agent-a"));

        tokio::spawn(run(
            event_rx,
            Processor::Raw,
            batch_tx,
            stats,
            test_config(1, 1.0),
            annotations,
        ));

        event_tx.send(Event::now("x")).await.unwrap();
        let batch = tokio::time::timeout(Duration::from_secs(1), batch_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch[0].meta["agent_id"], serde_json::json!("agent-a"));
    }
}
