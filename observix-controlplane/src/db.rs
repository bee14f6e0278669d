use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    // WAL lets readers proceed while the single writer holds the store;
    // in-memory databases (tests) ignore the pragma.
    let in_memory = database_url.contains(":memory:");
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // A shared in-memory database only exists per connection, so tests must
    // not fan out across a pool.
    let max_connections = if in_memory { 1 } else { 10 };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create pipelines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipelines (
            pipeline_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            spec_json TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create assignments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            assignment_id TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL,
            region TEXT NOT NULL,
            pipeline_id TEXT NOT NULL REFERENCES pipelines(pipeline_id),
            created_at TEXT NOT NULL,
            UNIQUE(agent_id, region, pipeline_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create agents table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS agents (
            agent_id TEXT PRIMARY KEY,
            region TEXT NOT NULL,
            first_seen_at TEXT NOT NULL,
            last_seen_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for the agent poll path
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assignments_agent_region ON assignments(agent_id, region)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assignments_pipeline ON assignments(pipeline_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
