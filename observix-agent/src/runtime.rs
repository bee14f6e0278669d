//! Agent runtime
//!
//! `start()` blocks on the reconcile loop until `stop()` (or the shutdown
//! signal wired in main) fires; `stats()` returns a detached snapshot of
//! every running pipeline's counters.

use std::collections::HashMap;
use std::sync::Arc;

use observix_client::ControlPlaneClient;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::scheduler::Reconciler;
use crate::stats::{StatsRegistry, StatsSnapshot};

pub struct AgentRuntime {
    config: AgentConfig,
    registry: StatsRegistry,
    cancel: CancellationToken,
}

impl AgentRuntime {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            registry: StatsRegistry::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Run the reconciliation loop; returns after `stop()` once every
    /// pipeline has been shut down (or abandoned past its deadline).
    pub async fn start(&self) {
        let client = Arc::new(ControlPlaneClient::new(&self.config.control_plane.url));
        let reconciler = Reconciler::new(
            self.config.clone(),
            client,
            self.registry.clone(),
            self.cancel.child_token(),
        );
        reconciler.run().await;
    }

    /// Initiate graceful shutdown.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Snapshot (not a live handle) of per-pipeline statistics.
    pub fn stats(&self) -> HashMap<Uuid, StatsSnapshot> {
        self.registry.snapshot_all()
    }
}
