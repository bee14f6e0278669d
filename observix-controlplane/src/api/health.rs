//! Health Check API Handler

use axum::{Json, extract::State};
use serde_json::json;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /healthz
/// 200 when the store is reachable
pub async fn healthz(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;
    Ok(Json(json!({ "ok": true })))
}
