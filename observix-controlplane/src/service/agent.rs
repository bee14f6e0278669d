//! Agent Service
//!
//! Liveness is computed from `last_seen_at` at read time; the periodic sweep
//! only logs agents crossing the offline threshold.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use observix_core::domain::agent::{AgentInfo, AgentStatus};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::repository::agent as agent_repository;

/// Service error type
#[derive(Debug)]
pub enum AgentError {
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for AgentError {
    fn from(err: sqlx::Error) -> Self {
        AgentError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Upsert the agent record; called as a side effect of every poll
pub async fn touch(pool: &SqlitePool, agent_id: &str, region: &str) -> Result<()> {
    agent_repository::touch(pool, agent_id, region).await?;
    Ok(())
}

/// List agents with status computed against the offline threshold
pub async fn list_agents(pool: &SqlitePool, threshold_seconds: i64) -> Result<Vec<AgentInfo>> {
    let now = Utc::now();
    let rows = agent_repository::list_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| AgentInfo {
            status: AgentStatus::from_last_seen(row.last_seen_at, now, threshold_seconds),
            agent_id: row.agent_id,
            region: row.region,
            first_seen_at: row.first_seen_at,
            last_seen_at: row.last_seen_at,
        })
        .collect())
}

/// Periodic liveness sweep: logs agents that stopped (or resumed) polling.
///
/// Runs until cancelled; sweep failures are logged and retried next tick.
pub async fn liveness_sweep(pool: SqlitePool, threshold_seconds: i64, cancel: CancellationToken) {
    let mut offline: HashSet<String> = HashSet::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let agents = match list_agents(&pool, threshold_seconds).await {
            Ok(agents) => agents,
            Err(AgentError::DatabaseError(e)) => {
                tracing::warn!("Liveness sweep failed: {}", e);
                continue;
            }
        };

        for agent in agents {
            match agent.status {
                AgentStatus::Offline => {
                    if offline.insert(agent.agent_id.clone()) {
                        tracing::warn!(
                            "Agent went offline: {} (last seen {})",
                            agent.agent_id,
                            agent.last_seen_at
                        );
                    }
                }
                AgentStatus::Online => {
                    if offline.remove(&agent.agent_id) {
                        tracing::info!("Agent back online: {}", agent.agent_id);
                    }
                }
            }
        }
    }
}
