//! Pipeline-related API endpoints

use crate::ControlPlaneClient;
use crate::error::Result;
use observix_core::domain::pipeline::Pipeline;
use observix_core::dto::pipeline::{CreatePipeline, PipelineCreated, PipelineUpdated, UpdatePipeline};
use uuid::Uuid;

impl ControlPlaneClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a new pipeline
    ///
    /// # Arguments
    /// * `req` - The pipeline creation request
    ///
    /// # Returns
    /// The assigned pipeline id and initial version
    pub async fn create_pipeline(&self, req: CreatePipeline) -> Result<PipelineCreated> {
        let url = format!("{}/v1/pipelines", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// List all pipelines
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let url = format!("{}/v1/pipelines", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Update a pipeline; absent fields are left unchanged
    ///
    /// # Returns
    /// The version after the update (bumped only when something changed)
    pub async fn update_pipeline(
        &self,
        pipeline_id: Uuid,
        req: UpdatePipeline,
    ) -> Result<PipelineUpdated> {
        let url = format!("{}/v1/pipelines/{}", self.base_url, pipeline_id);
        let response = self.client.put(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline; all assignments referencing it are removed
    pub async fn delete_pipeline(&self, pipeline_id: Uuid) -> Result<()> {
        let url = format!("{}/v1/pipelines/{}", self.base_url, pipeline_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
