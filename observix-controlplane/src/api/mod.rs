//! API Module
//!
//! HTTP API layer for the control plane.
//! Each submodule handles endpoints for a specific resource.

pub mod agent;
pub mod assignment;
pub mod error;
pub mod health;
pub mod pipeline;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handler state.
///
/// All write endpoints serialize through `writer`; reads go straight to the
/// pool.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub writer: Arc<Mutex<()>>,
    pub agent_offline_threshold_seconds: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, agent_offline_threshold_seconds: i64) -> Self {
        Self {
            pool,
            writer: Arc::new(Mutex::new(())),
            agent_offline_threshold_seconds,
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, allow_origins: &[String]) -> Router {
    Router::new()
        // Health check
        .route("/healthz", get(health::healthz))
        // Pipeline endpoints
        .route("/v1/pipelines", post(pipeline::create_pipeline))
        .route("/v1/pipelines", get(pipeline::list_pipelines))
        .route("/v1/pipelines/{id}", put(pipeline::update_pipeline))
        .route("/v1/pipelines/{id}", delete(pipeline::delete_pipeline))
        // Assignment endpoints
        .route("/v1/assignments", post(assignment::create_assignment))
        .route(
            "/v1/assignments/{assignment_id}",
            delete(assignment::delete_assignment),
        )
        // Agent endpoints
        .route("/v1/agents", get(agent::list_agents))
        .route(
            "/v1/agents/{agent_id}/assignments",
            get(agent::poll_assignments),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allow_origins))
}

fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    if allow_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
