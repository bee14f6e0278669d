//! Pipeline Service
//!
//! Business logic for pipeline management: spec validation on write, version
//! bumps on real changes, and cascade deletion.

use observix_core::domain::pipeline::Pipeline;
use observix_core::dto::pipeline::{CreatePipeline, UpdatePipeline};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::repository::pipeline as pipeline_repository;

/// Service error type
#[derive(Debug)]
pub enum PipelineError {
    NotFound(Uuid),
    InvalidSpec(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        PipelineError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Create a new pipeline at version 1
pub async fn create_pipeline(pool: &SqlitePool, req: CreatePipeline) -> Result<Pipeline> {
    if req.name.trim().is_empty() {
        return Err(PipelineError::InvalidSpec(
            "pipeline name cannot be empty".to_string(),
        ));
    }
    req.spec
        .validate()
        .map_err(|e| PipelineError::InvalidSpec(e.to_string()))?;

    let pipeline = pipeline_repository::create(pool, &req.name, req.enabled, &req.spec).await?;

    tracing::info!(
        "Pipeline created: {} ({})",
        pipeline.name,
        pipeline.pipeline_id
    );

    Ok(pipeline)
}

/// List all pipelines
pub async fn list_pipelines(pool: &SqlitePool) -> Result<Vec<Pipeline>> {
    let pipelines = pipeline_repository::list_all(pool).await?;
    Ok(pipelines)
}

/// Apply a partial update, bumping `version` only when something changed.
///
/// Returns the version after the update; a byte-identical update returns the
/// stored version untouched.
pub async fn update_pipeline(pool: &SqlitePool, id: Uuid, req: UpdatePipeline) -> Result<i64> {
    let existing = pipeline_repository::find_by_id(pool, id)
        .await?
        .ok_or(PipelineError::NotFound(id))?;

    let name = req.name.unwrap_or_else(|| existing.name.clone());
    let enabled = req.enabled.unwrap_or(existing.enabled);
    let spec = req.spec.unwrap_or_else(|| existing.spec.clone());

    if name.trim().is_empty() {
        return Err(PipelineError::InvalidSpec(
            "pipeline name cannot be empty".to_string(),
        ));
    }
    spec.validate()
        .map_err(|e| PipelineError::InvalidSpec(e.to_string()))?;

    let unchanged =
        name == existing.name && enabled == existing.enabled && spec == existing.spec;
    if unchanged {
        return Ok(existing.version);
    }

    let version = existing.version + 1;
    let updated = pipeline_repository::update(pool, id, &name, enabled, &spec, version).await?;
    if !updated {
        return Err(PipelineError::NotFound(id));
    }

    tracing::info!("Pipeline updated: {} -> version {}", id, version);

    Ok(version)
}

/// Delete a pipeline; its assignments are removed in the same transaction
pub async fn delete_pipeline(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let deleted = pipeline_repository::delete(pool, id).await?;

    if !deleted {
        return Err(PipelineError::NotFound(id));
    }

    tracing::info!("Pipeline deleted: {}", id);

    Ok(())
}
