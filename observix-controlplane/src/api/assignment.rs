//! Assignment API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use observix_core::domain::assignment::Assignment;
use observix_core::dto::assignment::CreateAssignment;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::assignment::{self as assignment_service, AssignmentError};

fn map_err(e: AssignmentError) -> ApiError {
    match e {
        AssignmentError::PipelineNotFound(id) => {
            ApiError::NotFound(format!("Pipeline {} not found", id))
        }
        AssignmentError::AssignmentNotFound(id) => {
            ApiError::NotFound(format!("Assignment {} not found", id))
        }
        AssignmentError::Duplicate => {
            ApiError::Conflict("Pipeline is already assigned to this agent and region".to_string())
        }
        AssignmentError::DatabaseError(err) => ApiError::DatabaseError(err),
    }
}

/// POST /v1/assignments
/// Bind a pipeline to (agent, region); 409 on duplicate, 404 on unknown pipeline
pub async fn create_assignment(
    State(state): State<AppState>,
    Json(req): Json<CreateAssignment>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    tracing::info!(
        "Creating assignment: {} @ {} -> {}",
        req.agent_id,
        req.region,
        req.pipeline_id
    );

    let _write = state.writer.lock().await;
    let assignment = assignment_service::create_assignment(&state.pool, req)
        .await
        .map_err(map_err)?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /v1/assignments/{assignment_id}
/// Delete an assignment
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting assignment: {}", assignment_id);

    let _write = state.writer.lock().await;
    assignment_service::delete_assignment(&state.pool, assignment_id)
        .await
        .map_err(map_err)?;

    Ok(StatusCode::NO_CONTENT)
}
