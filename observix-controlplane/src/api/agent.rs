//! Agent API Handlers
//!
//! Agent listing and the assignment poll. The poll is read-only apart from
//! the narrow `last_seen_at` upsert and honors `If-None-Match` so agents can
//! skip no-op reconciliations.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use observix_core::domain::agent::AgentInfo;
use serde::Deserialize;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::agent::{self as agent_service, AgentError};
use crate::service::assignment as assignment_service;

#[derive(Debug, Deserialize)]
pub struct PollParams {
    pub region: String,
}

/// GET /v1/agents
/// List agents with status computed from `last_seen_at`
pub async fn list_agents(State(state): State<AppState>) -> ApiResult<Json<Vec<AgentInfo>>> {
    tracing::debug!("Listing all agents");

    let agents =
        agent_service::list_agents(&state.pool, state.agent_offline_threshold_seconds)
            .await
            .map_err(|AgentError::DatabaseError(err)| ApiError::DatabaseError(err))?;

    Ok(Json(agents))
}

/// GET /v1/agents/{agent_id}/assignments?region=R
/// The agent poll: upserts the agent record and returns the assignment view,
/// or 304 when `If-None-Match` matches the current revision
pub async fn poll_assignments(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Query(params): Query<PollParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    tracing::debug!("Assignment poll: {} @ {}", agent_id, params.region);

    {
        let _write = state.writer.lock().await;
        agent_service::touch(&state.pool, &agent_id, &params.region)
            .await
            .map_err(|AgentError::DatabaseError(err)| ApiError::DatabaseError(err))?;
    }

    let view = assignment_service::view_for_agent(&state.pool, &agent_id, &params.region)
        .await
        .map_err(ApiError::DatabaseError)?;

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == view.revision);

    let response = if not_modified {
        (
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, view.revision.clone())],
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            [(header::ETAG, view.revision.clone())],
            Json(view),
        )
            .into_response()
    };

    Ok(response)
}
