//! Assignment domain type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binding of one pipeline to one (agent, region).
///
/// `(agent_id, region, pipeline_id)` is unique within the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: Uuid,
    pub agent_id: String,
    pub region: String,
    pub pipeline_id: Uuid,
    pub created_at: DateTime<Utc>,
}
