//! Assignment Service
//!
//! Business logic for assignments and the per-poll assignment view, including
//! the revision hash the agent uses for conditional polling.

use observix_core::domain::assignment::Assignment;
use observix_core::dto::assignment::{AssignedPipeline, AssignmentView, CreateAssignment};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::repository::assignment as assignment_repository;
use crate::repository::pipeline as pipeline_repository;

/// Service error type
#[derive(Debug)]
pub enum AssignmentError {
    PipelineNotFound(Uuid),
    AssignmentNotFound(Uuid),
    Duplicate,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for AssignmentError {
    fn from(err: sqlx::Error) -> Self {
        AssignmentError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, AssignmentError>;

/// Bind a pipeline to (agent, region)
pub async fn create_assignment(pool: &SqlitePool, req: CreateAssignment) -> Result<Assignment> {
    let pipeline = pipeline_repository::find_by_id(pool, req.pipeline_id).await?;
    if pipeline.is_none() {
        return Err(AssignmentError::PipelineNotFound(req.pipeline_id));
    }

    if assignment_repository::exists(pool, &req.agent_id, &req.region, req.pipeline_id).await? {
        return Err(AssignmentError::Duplicate);
    }

    let assignment =
        assignment_repository::create(pool, &req.agent_id, &req.region, req.pipeline_id).await?;

    tracing::info!(
        "Assignment created: {} ({} @ {} -> {})",
        assignment.assignment_id,
        assignment.agent_id,
        assignment.region,
        assignment.pipeline_id
    );

    Ok(assignment)
}

/// Delete an assignment
pub async fn delete_assignment(pool: &SqlitePool, assignment_id: Uuid) -> Result<()> {
    let deleted = assignment_repository::delete(pool, assignment_id).await?;

    if !deleted {
        return Err(AssignmentError::AssignmentNotFound(assignment_id));
    }

    tracing::info!("Assignment deleted: {}", assignment_id);

    Ok(())
}

/// Build the assignment view an agent consumes on every poll
pub async fn view_for_agent(
    pool: &SqlitePool,
    agent_id: &str,
    region: &str,
) -> std::result::Result<AssignmentView, sqlx::Error> {
    let pipelines = assignment_repository::pipelines_for_agent(pool, agent_id, region).await?;
    let revision = compute_revision(&pipelines);

    Ok(AssignmentView {
        revision,
        pipelines,
    })
}

/// Content hash over the sorted (pipeline_id, version, enabled) tuples.
///
/// Changes iff what the agent should run changes; unrelated catalog edits
/// leave it untouched.
pub fn compute_revision(pipelines: &[AssignedPipeline]) -> String {
    let basis = pipelines
        .iter()
        .map(|p| format!("{}:{}:{}", p.pipeline_id, p.version, p.enabled as u8))
        .collect::<Vec<_>>()
        .join("|");

    hex::encode(Sha256::digest(basis.as_bytes()))
}
