//! Pipeline Repository
//!
//! Handles all database operations related to pipelines.

use observix_core::domain::pipeline::{Pipeline, PipelineSpec};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Create a new pipeline at version 1
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    enabled: bool,
    spec: &PipelineSpec,
) -> Result<Pipeline, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let spec_json = serde_json::to_string(spec).map_err(into_decode_error)?;

    sqlx::query(
        r#"
        INSERT INTO pipelines (pipeline_id, name, enabled, spec_json, version, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(enabled)
    .bind(&spec_json)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Pipeline {
        pipeline_id: id,
        name: name.to_string(),
        enabled,
        version: 1,
        spec: spec.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Find a pipeline by ID
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Pipeline>, sqlx::Error> {
    let row = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT pipeline_id, name, enabled, spec_json, version, created_at, updated_at
        FROM pipelines
        WHERE pipeline_id = ?1
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(Pipeline::try_from).transpose()
}

/// List all pipelines
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Pipeline>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT pipeline_id, name, enabled, spec_json, version, created_at, updated_at
        FROM pipelines
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Pipeline::try_from).collect()
}

/// Persist an updated pipeline record at its new version
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    enabled: bool,
    spec: &PipelineSpec,
    version: i64,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();
    let spec_json = serde_json::to_string(spec).map_err(into_decode_error)?;

    let result = sqlx::query(
        r#"
        UPDATE pipelines
        SET name = ?1, enabled = ?2, spec_json = ?3, version = ?4, updated_at = ?5
        WHERE pipeline_id = ?6
        "#,
    )
    .bind(name)
    .bind(enabled)
    .bind(&spec_json)
    .bind(version)
    .bind(now)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a pipeline and cascade to its assignments in one transaction
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM assignments WHERE pipeline_id = ?1")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM pipelines WHERE pipeline_id = ?1")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

fn into_decode_error(err: serde_json::Error) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
pub(crate) struct PipelineRow {
    pub(crate) pipeline_id: String,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) spec_json: String,
    pub(crate) version: i64,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
    pub(crate) updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PipelineRow> for Pipeline {
    type Error = sqlx::Error;

    fn try_from(row: PipelineRow) -> Result<Self, Self::Error> {
        let spec: PipelineSpec =
            serde_json::from_str(&row.spec_json).map_err(into_decode_error)?;
        let pipeline_id = Uuid::parse_str(&row.pipeline_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Pipeline {
            pipeline_id,
            name: row.name,
            enabled: row.enabled,
            version: row.version,
            spec,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
