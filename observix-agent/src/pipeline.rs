//! Pipeline lifecycle
//!
//! One running pipeline is three tasks around one bounded queue:
//!
//! ```text
//! [source] --push--> [bounded queue] --> [batcher+processor] --> [destination]
//! ```
//!
//! States: Starting -> Running -> Stopping -> Stopped, with Failed reached
//! only when startup (source or destination acquisition) fails. Stopping
//! closes the source first so no new events enter, drains the queue, and
//! abandons tasks that outlive the shutdown deadline.

use std::sync::Arc;
use std::time::Duration;

use observix_core::dto::assignment::AssignedPipeline;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::batcher::{self, Annotations, BatcherConfig};
use crate::destinations::{self, Destination};
use crate::processors::Processor;
use crate::sources::Source;
use crate::stats::PipelineStats;

/// Identity stamped onto every event this agent forwards.
#[derive(Debug, Clone)]
pub struct AgentIdentity {
    pub agent_id: String,
    pub region: String,
}

pub struct RunningPipeline {
    pub pipeline_id: Uuid,
    pub name: String,
    pub version: i64,
    pub stats: Arc<PipelineStats>,
    cancel: CancellationToken,
    source_task: JoinHandle<()>,
    batcher_task: JoinHandle<()>,
    destination_task: JoinHandle<()>,
}

impl RunningPipeline {
    /// Start all three tasks. Listener and sink acquisition happen before any
    /// task spawns, so a bind failure leaves nothing behind to clean up.
    pub async fn start(
        assigned: &AssignedPipeline,
        identity: &AgentIdentity,
    ) -> anyhow::Result<RunningPipeline> {
        let spec = &assigned.spec;

        let source = Source::open(&spec.source).await?;
        let destination = Destination::open(&spec.destination).await?;
        let processor = Processor::from_spec(&spec.processor);

        let max_queue_size = match &spec.source {
            observix_core::SourceSpec::SyslogUdp { options } => options.max_queue_size,
            observix_core::SourceSpec::FileTail { options } => options.max_queue_size,
            observix_core::SourceSpec::HttpListener { options } => options.max_queue_size,
        };

        let (event_tx, event_rx) = mpsc::channel(max_queue_size);
        let (batch_tx, batch_rx) = mpsc::channel(2);
        let stats = Arc::new(PipelineStats::default());
        let cancel = CancellationToken::new();

        let mut annotations = Annotations::new();
        annotations.insert("agent_id".to_string(), json!(identity.agent_id));
        annotations.insert("region".to_string(), json!(identity.region));
        annotations.insert("pipeline".to_string(), json!(assigned.name));
        annotations.insert("pipeline_id".to_string(), json!(assigned.pipeline_id));

        let source_task = tokio::spawn(source.run(
            event_tx,
            stats.clone(),
            cancel.child_token(),
        ));
        let batcher_task = tokio::spawn(batcher::run(
            event_rx,
            processor,
            batch_tx,
            stats.clone(),
            BatcherConfig {
                batch_max_events: spec.batch_max_events,
                batch_max_seconds: spec.batch_max_seconds,
            },
            annotations,
        ));
        let destination_task = tokio::spawn(destinations::run(
            destination,
            batch_rx,
            stats.clone(),
        ));

        info!(
            "Pipeline running: {} ({} v{})",
            assigned.name, assigned.pipeline_id, assigned.version
        );

        Ok(RunningPipeline {
            pipeline_id: assigned.pipeline_id,
            name: assigned.name.clone(),
            version: assigned.version,
            stats,
            cancel,
            source_task,
            batcher_task,
            destination_task,
        })
    }

    /// Graceful stop: cancel the source, let the queue drain and the final
    /// batch flush, then wait for all three tasks up to `deadline`.
    ///
    /// Returns false when the deadline elapsed and the tasks were abandoned.
    pub async fn stop(self, deadline: Duration) -> bool {
        debug!("Stopping pipeline {}", self.pipeline_id);
        self.cancel.cancel();

        let join_all = async {
            let _ = self.source_task.await;
            let _ = self.batcher_task.await;
            let _ = self.destination_task.await;
        };

        match tokio::time::timeout(deadline, join_all).await {
            Ok(()) => {
                debug!("Pipeline stopped: {}", self.pipeline_id);
                true
            }
            Err(_) => {
                warn!(
                    "Pipeline {} did not stop within {:?}; abandoning its tasks",
                    self.pipeline_id, deadline
                );
                false
            }
        }
    }
}
