//! Assignment DTOs, including the per-poll view an agent consumes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pipeline::PipelineSpec;

/// Request to bind a pipeline to (agent, region).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignment {
    pub agent_id: String,
    pub region: String,
    pub pipeline_id: Uuid,
}

/// The poll response: everything the agent should currently run.
///
/// `revision` changes iff the set of (pipeline_id, version, enabled) for this
/// agent and region changes; the agent echoes it back in `If-None-Match` to
/// short-circuit no-op reconciliations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentView {
    pub revision: String,
    pub pipelines: Vec<AssignedPipeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedPipeline {
    pub pipeline_id: Uuid,
    pub name: String,
    pub version: i64,
    pub enabled: bool,
    pub spec: PipelineSpec,
}
