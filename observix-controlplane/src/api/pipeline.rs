//! Pipeline API Handlers
//!
//! HTTP endpoints for pipeline management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use observix_core::domain::pipeline::Pipeline;
use observix_core::dto::pipeline::{
    CreatePipeline, PipelineCreated, PipelineUpdated, UpdatePipeline,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::pipeline::{self as pipeline_service, PipelineError};

fn map_err(e: PipelineError) -> ApiError {
    match e {
        PipelineError::NotFound(id) => ApiError::NotFound(format!("Pipeline {} not found", id)),
        PipelineError::InvalidSpec(msg) => ApiError::InvalidSpec(msg),
        PipelineError::DatabaseError(err) => ApiError::DatabaseError(err),
    }
}

/// POST /v1/pipelines
/// Create a new pipeline
pub async fn create_pipeline(
    State(state): State<AppState>,
    Json(req): Json<CreatePipeline>,
) -> ApiResult<(StatusCode, Json<PipelineCreated>)> {
    tracing::info!("Creating pipeline: {}", req.name);

    let _write = state.writer.lock().await;
    let pipeline = pipeline_service::create_pipeline(&state.pool, req)
        .await
        .map_err(map_err)?;

    Ok((
        StatusCode::CREATED,
        Json(PipelineCreated {
            pipeline_id: pipeline.pipeline_id,
            version: pipeline.version,
        }),
    ))
}

/// GET /v1/pipelines
/// List all pipelines
pub async fn list_pipelines(State(state): State<AppState>) -> ApiResult<Json<Vec<Pipeline>>> {
    tracing::debug!("Listing all pipelines");

    let pipelines = pipeline_service::list_pipelines(&state.pool)
        .await
        .map_err(map_err)?;

    Ok(Json(pipelines))
}

/// PUT /v1/pipelines/{id}
/// Apply a partial update; the version is bumped only on a real change
pub async fn update_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePipeline>,
) -> ApiResult<Json<PipelineUpdated>> {
    tracing::info!("Updating pipeline: {}", id);

    let _write = state.writer.lock().await;
    let version = pipeline_service::update_pipeline(&state.pool, id, req)
        .await
        .map_err(map_err)?;

    Ok(Json(PipelineUpdated { version }))
}

/// DELETE /v1/pipelines/{id}
/// Delete a pipeline, cascading to its assignments
pub async fn delete_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting pipeline: {}", id);

    let _write = state.writer.lock().await;
    pipeline_service::delete_pipeline(&state.pool, id)
        .await
        .map_err(map_err)?;

    Ok(StatusCode::NO_CONTENT)
}
