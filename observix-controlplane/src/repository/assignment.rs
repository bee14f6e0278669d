//! Assignment Repository
//!
//! Handles all database operations related to assignments, including the
//! joined fetch backing the agent poll.

use observix_core::domain::assignment::Assignment;
use observix_core::dto::assignment::AssignedPipeline;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::repository::pipeline::PipelineRow;

/// Create an assignment binding a pipeline to (agent, region)
pub async fn create(
    pool: &SqlitePool,
    agent_id: &str,
    region: &str,
    pipeline_id: Uuid,
) -> Result<Assignment, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO assignments (assignment_id, agent_id, region, pipeline_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(id.to_string())
    .bind(agent_id)
    .bind(region)
    .bind(pipeline_id.to_string())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Assignment {
        assignment_id: id,
        agent_id: agent_id.to_string(),
        region: region.to_string(),
        pipeline_id,
        created_at: now,
    })
}

/// Check whether (agent, region, pipeline) is already bound
pub async fn exists(
    pool: &SqlitePool,
    agent_id: &str,
    region: &str,
    pipeline_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT assignment_id FROM assignments
        WHERE agent_id = ?1 AND region = ?2 AND pipeline_id = ?3
        "#,
    )
    .bind(agent_id)
    .bind(region)
    .bind(pipeline_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Delete an assignment by ID
pub async fn delete(pool: &SqlitePool, assignment_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE assignment_id = ?1")
        .bind(assignment_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch the pipelines assigned to (agent, region), ordered by pipeline id so
/// the revision hash over the result is deterministic
pub async fn pipelines_for_agent(
    pool: &SqlitePool,
    agent_id: &str,
    region: &str,
) -> Result<Vec<AssignedPipeline>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT p.pipeline_id, p.name, p.enabled, p.spec_json, p.version, p.created_at, p.updated_at
        FROM assignments a
        JOIN pipelines p ON p.pipeline_id = a.pipeline_id
        WHERE a.agent_id = ?1 AND a.region = ?2
        ORDER BY p.pipeline_id ASC
        "#,
    )
    .bind(agent_id)
    .bind(region)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let pipeline = observix_core::domain::pipeline::Pipeline::try_from(row)?;
            Ok(AssignedPipeline {
                pipeline_id: pipeline.pipeline_id,
                name: pipeline.name,
                version: pipeline.version,
                enabled: pipeline.enabled,
                spec: pipeline.spec,
            })
        })
        .collect()
}
