//! Agent Repository
//!
//! Handles agent registration rows. The poll endpoint upserts here on every
//! request; there is no separate register call.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// One agents-table row; status is computed by the service layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentRow {
    pub agent_id: String,
    pub region: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Upsert the agent record, refreshing `last_seen_at`
pub async fn touch(pool: &SqlitePool, agent_id: &str, region: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO agents (agent_id, region, first_seen_at, last_seen_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (agent_id) DO UPDATE SET
            region = excluded.region,
            last_seen_at = excluded.last_seen_at
        "#,
    )
    .bind(agent_id)
    .bind(region)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all agents
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<AgentRow>, sqlx::Error> {
    sqlx::query_as::<_, AgentRow>(
        r#"
        SELECT agent_id, region, first_seen_at, last_seen_at
        FROM agents
        ORDER BY first_seen_at ASC
        "#,
    )
    .fetch_all(pool)
    .await
}
