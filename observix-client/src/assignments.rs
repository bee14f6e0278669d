//! Assignment endpoints and the agent poll

use crate::ControlPlaneClient;
use crate::error::{ClientError, Result};
use observix_core::domain::assignment::Assignment;
use observix_core::dto::assignment::{AssignmentView, CreateAssignment};
use uuid::Uuid;

impl ControlPlaneClient {
    // =============================================================================
    // Assignment Management
    // =============================================================================

    /// Bind a pipeline to (agent, region)
    pub async fn create_assignment(&self, req: CreateAssignment) -> Result<Assignment> {
        let url = format!("{}/v1/assignments", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Delete an assignment by id
    pub async fn delete_assignment(&self, assignment_id: Uuid) -> Result<()> {
        let url = format!("{}/v1/assignments/{}", self.base_url, assignment_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Agent Poll
    // =============================================================================

    /// Fetch the assignment view for an agent in a region.
    ///
    /// When `last_revision` is supplied it is sent as `If-None-Match`; an
    /// unchanged view comes back as 304 and `Ok(None)` so the caller can skip
    /// reconciliation entirely.
    pub async fn poll_assignments(
        &self,
        agent_id: &str,
        region: &str,
        last_revision: Option<&str>,
    ) -> Result<Option<AssignmentView>> {
        let url = format!("{}/v1/agents/{}/assignments", self.base_url, agent_id);
        let mut request = self.client.get(&url).query(&[("region", region)]);
        if let Some(revision) = last_revision {
            request = request.header(reqwest::header::IF_NONE_MATCH, revision);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status, body));
        }

        let view: AssignmentView = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;
        Ok(Some(view))
    }
}
