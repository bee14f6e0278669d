//! Agent listing and health endpoints

use crate::ControlPlaneClient;
use crate::error::Result;
use observix_core::domain::agent::AgentInfo;

impl ControlPlaneClient {
    /// List registered agents with their computed status
    pub async fn list_agents(&self) -> Result<Vec<AgentInfo>> {
        let url = format!("{}/v1/agents", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Check control plane liveness
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/healthz", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
