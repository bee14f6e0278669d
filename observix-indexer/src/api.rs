//! Indexer API
//!
//! `POST /v1/normalize` and `GET /healthz`. The response key is fixed as
//! `docs` and every document carries a non-empty `raw`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use observix_core::dto::error::ErrorBody;
use observix_core::dto::normalize::{Doc, NormalizeRequest, NormalizeResponse};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::profiles::ProfileRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProfileRegistry>,
}

/// Create the indexer router
pub fn create_router(registry: Arc<ProfileRegistry>, max_request_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/normalize", post(normalize))
        .with_state(AppState { registry })
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(TraceLayer::new_for_http())
}

/// GET /healthz
async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// POST /v1/normalize
/// Normalize a batch of raw lines under a named profile
async fn normalize(
    State(state): State<AppState>,
    Json(req): Json<NormalizeRequest>,
) -> Response {
    let Some(profile) = state.registry.get(&req.profile) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(
                "unknown_profile",
                format!("Unknown profile: {}", req.profile),
            )),
        )
            .into_response();
    };

    let docs: Vec<Doc> = req
        .raw
        .into_lines()
        .into_iter()
        .map(|line| {
            let mut doc = profile.normalize(&line);
            // The original line always survives under `raw`, whatever the
            // profile extracted.
            doc.insert("raw".to_string(), Value::String(line));
            doc
        })
        .collect();

    tracing::debug!("Normalized {} line(s)", docs.len());

    Json(NormalizeResponse { docs }).into_response()
}
