//! Assignment reconciler
//!
//! Polls the control plane every poll interval (jittered ±20%) and applies
//! the resulting plan: removals first, then mutations (stop-then-start), then
//! additions. Poll or apply errors are logged and retried next tick; they
//! never crash the agent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use observix_client::ControlPlaneClient;
use observix_core::dto::assignment::AssignedPipeline;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::pipeline::{AgentIdentity, RunningPipeline};
use crate::scheduler::plan::compute_plan;
use crate::stats::StatsRegistry;

pub struct Reconciler {
    config: AgentConfig,
    identity: AgentIdentity,
    client: Arc<ControlPlaneClient>,
    registry: StatsRegistry,
    cancel: CancellationToken,
    running: HashMap<Uuid, RunningPipeline>,
    /// Pipelines whose startup failed, by the version that failed; retried
    /// only when the version changes.
    failed: HashMap<Uuid, i64>,
    last_revision: Option<String>,
}

impl Reconciler {
    pub fn new(
        config: AgentConfig,
        client: Arc<ControlPlaneClient>,
        registry: StatsRegistry,
        cancel: CancellationToken,
    ) -> Self {
        let identity = AgentIdentity {
            agent_id: config.agent_id.clone(),
            region: config.region.clone(),
        };
        Self {
            config,
            identity,
            client,
            registry,
            cancel,
            running: HashMap::new(),
            failed: HashMap::new(),
            last_revision: None,
        }
    }

    /// Run the reconcile loop until cancelled, then stop every pipeline.
    pub async fn run(mut self) {
        info!(
            "Starting assignment reconciler (interval: {:?})",
            self.config.poll_interval()
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.reconcile_once().await {
                Ok(applied) => {
                    if applied {
                        debug!("Reconcile applied; {} pipeline(s) running", self.running.len());
                    }
                }
                Err(e) => {
                    error!("Reconcile cycle failed: {}", e);
                }
            }

            self.log_stats();

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(jittered(self.config.poll_interval())) => {}
            }
        }

        self.stop_all().await;
        info!("Reconciler stopped");
    }

    /// One poll + apply cycle. Returns false when the conditional poll
    /// short-circuited (304).
    async fn reconcile_once(&mut self) -> observix_client::Result<bool> {
        let view = match self
            .client
            .poll_assignments(
                &self.config.agent_id,
                &self.config.region,
                self.last_revision.as_deref(),
            )
            .await?
        {
            None => return Ok(false),
            Some(view) => view,
        };

        let running_versions: HashMap<Uuid, i64> = self
            .running
            .iter()
            .map(|(id, pipeline)| (*id, pipeline.version))
            .collect();
        let plan = compute_plan(&running_versions, &self.failed, &view);

        if !plan.is_empty() {
            info!(
                "Applying plan: {} removal(s), {} mutation(s), {} addition(s)",
                plan.removals.len(),
                plan.mutations.len(),
                plan.additions.len()
            );
        }

        let deadline = self.config.shutdown_deadline();

        for pipeline_id in plan.removals {
            if let Some(pipeline) = self.running.remove(&pipeline_id) {
                self.registry.remove(&pipeline_id);
                pipeline.stop(deadline).await;
            }
            self.failed.remove(&pipeline_id);
        }

        for assigned in plan.mutations {
            if let Some(pipeline) = self.running.remove(&assigned.pipeline_id) {
                self.registry.remove(&assigned.pipeline_id);
                let clean = pipeline.stop(deadline).await;
                if !clean {
                    warn!(
                        "Old instance of {} abandoned; starting v{} anyway",
                        assigned.pipeline_id, assigned.version
                    );
                }
            }
            self.start_pipeline(assigned).await;
        }

        for assigned in plan.additions {
            self.start_pipeline(assigned).await;
        }

        // Forget failures for pipelines no longer assigned at all.
        let desired: std::collections::HashSet<Uuid> = view
            .pipelines
            .iter()
            .map(|pipeline| pipeline.pipeline_id)
            .collect();
        self.failed.retain(|pipeline_id, _| desired.contains(pipeline_id));

        self.last_revision = Some(view.revision);
        Ok(true)
    }

    async fn start_pipeline(&mut self, assigned: AssignedPipeline) {
        match RunningPipeline::start(&assigned, &self.identity).await {
            Ok(pipeline) => {
                self.failed.remove(&assigned.pipeline_id);
                self.registry
                    .insert(assigned.pipeline_id, pipeline.stats.clone());
                self.running.insert(assigned.pipeline_id, pipeline);
            }
            Err(e) => {
                error!(
                    "Pipeline {} (v{}) failed to start: {:#}",
                    assigned.pipeline_id, assigned.version, e
                );
                self.failed.insert(assigned.pipeline_id, assigned.version);
            }
        }
    }

    async fn stop_all(&mut self) {
        let deadline = self.config.shutdown_deadline();
        for (pipeline_id, pipeline) in self.running.drain() {
            self.registry.remove(&pipeline_id);
            pipeline.stop(deadline).await;
        }
    }

    fn log_stats(&self) {
        for (pipeline_id, pipeline) in &self.running {
            let snapshot = pipeline.stats.snapshot();
            debug!(
                "pipeline_stats pipeline_id={} name={} recv={} sent_events={} sent_batches={} failed_batches={} dropped={} buffer={}",
                pipeline_id,
                pipeline.name,
                snapshot.recv,
                snapshot.sent_events,
                snapshot.sent_batches,
                snapshot.failed_batches,
                snapshot.dropped_queue_full,
                snapshot.buffer,
            );
        }
    }
}

/// Jitter the poll interval by ±20% so a fleet does not poll in lockstep.
fn jittered(base: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.8..=1.2);
    base.mul_f64(factor)
}
