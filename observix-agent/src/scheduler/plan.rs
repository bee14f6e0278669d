//! Reconcile plan computation
//!
//! Pure diff between what is running and what the poll said should run.
//! Apply order is removals, then mutations (stop-then-start), then additions.

use std::collections::HashMap;

use observix_core::dto::assignment::{AssignedPipeline, AssignmentView};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Running but absent from the view, or present-but-disabled.
    pub removals: Vec<Uuid>,
    /// Running at a different version: stop the old instance, start the new.
    pub mutations: Vec<AssignedPipeline>,
    /// Enabled in the view but not running.
    pub additions: Vec<AssignedPipeline>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.mutations.is_empty() && self.additions.is_empty()
    }
}

/// Compute the plan for one reconcile tick.
///
/// `running` maps pipeline id to the running version; `failed` maps pipeline
/// id to the version whose startup failed. A failed pipeline is retried only
/// when its version changes.
pub fn compute_plan(
    running: &HashMap<Uuid, i64>,
    failed: &HashMap<Uuid, i64>,
    view: &AssignmentView,
) -> ReconcilePlan {
    let desired: HashMap<Uuid, &AssignedPipeline> = view
        .pipelines
        .iter()
        .filter(|pipeline| pipeline.enabled)
        .map(|pipeline| (pipeline.pipeline_id, pipeline))
        .collect();

    let mut plan = ReconcilePlan::default();

    for (pipeline_id, running_version) in running {
        match desired.get(pipeline_id) {
            None => plan.removals.push(*pipeline_id),
            Some(pipeline) if pipeline.version != *running_version => {
                plan.mutations.push((*pipeline).clone());
            }
            Some(_) => {}
        }
    }

    for (pipeline_id, pipeline) in &desired {
        if running.contains_key(pipeline_id) {
            continue;
        }
        if failed.get(pipeline_id) == Some(&pipeline.version) {
            continue;
        }
        plan.additions.push((*pipeline).clone());
    }

    // Deterministic apply order for logs and tests.
    plan.removals.sort_unstable();
    plan.mutations.sort_by_key(|pipeline| pipeline.pipeline_id);
    plan.additions.sort_by_key(|pipeline| pipeline.pipeline_id);

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use observix_core::domain::pipeline::PipelineSpec;

    fn sample_spec() -> PipelineSpec {
        serde_json::from_value(serde_json::json!({
            "source": {"type": "syslog_udp", "options": {"port": 15514}},
            "destination": {"type": "file", "options": {"path": "/tmp/out.log"}}
        }))
        .unwrap()
    }

    fn assigned(id: Uuid, version: i64, enabled: bool) -> AssignedPipeline {
        AssignedPipeline {
            pipeline_id: id,
            name: format!("p-{version}"),
            version,
            enabled,
            spec: sample_spec(),
        }
    }

    fn view(pipelines: Vec<AssignedPipeline>) -> AssignmentView {
        AssignmentView {
            revision: "rev".to_string(),
            pipelines,
        }
    }

    #[test]
    fn fresh_assignment_is_an_addition() {
        let id = Uuid::new_v4();
        let plan = compute_plan(
            &HashMap::new(),
            &HashMap::new(),
            &view(vec![assigned(id, 1, true)]),
        );

        assert_eq!(plan.additions.len(), 1);
        assert_eq!(plan.additions[0].pipeline_id, id);
        assert!(plan.removals.is_empty());
        assert!(plan.mutations.is_empty());
    }

    #[test]
    fn absent_and_disabled_pipelines_are_removals() {
        let gone = Uuid::new_v4();
        let disabled = Uuid::new_v4();
        let running = HashMap::from([(gone, 1), (disabled, 1)]);

        let plan = compute_plan(
            &running,
            &HashMap::new(),
            &view(vec![assigned(disabled, 1, false)]),
        );

        let mut expected = vec![gone, disabled];
        expected.sort_unstable();
        assert_eq!(plan.removals, expected);
        assert!(plan.additions.is_empty());
    }

    #[test]
    fn version_change_is_a_mutation() {
        let id = Uuid::new_v4();
        let running = HashMap::from([(id, 1)]);

        let plan = compute_plan(&running, &HashMap::new(), &view(vec![assigned(id, 2, true)]));

        assert_eq!(plan.mutations.len(), 1);
        assert_eq!(plan.mutations[0].version, 2);
        assert!(plan.removals.is_empty());
        assert!(plan.additions.is_empty());
    }

    #[test]
    fn unchanged_running_pipeline_is_left_alone() {
        let id = Uuid::new_v4();
        let running = HashMap::from([(id, 3)]);

        let plan = compute_plan(&running, &HashMap::new(), &view(vec![assigned(id, 3, true)]));
        assert!(plan.is_empty());
    }

    #[test]
    fn failed_pipeline_retries_only_on_version_change() {
        let id = Uuid::new_v4();
        let failed = HashMap::from([(id, 2)]);

        // Same version: leave it failed.
        let plan = compute_plan(&HashMap::new(), &failed, &view(vec![assigned(id, 2, true)]));
        assert!(plan.is_empty());

        // Version moved: try again.
        let plan = compute_plan(&HashMap::new(), &failed, &view(vec![assigned(id, 3, true)]));
        assert_eq!(plan.additions.len(), 1);
        assert_eq!(plan.additions[0].version, 3);
    }

    #[test]
    fn disabled_pipeline_is_never_an_addition() {
        let id = Uuid::new_v4();
        let plan = compute_plan(
            &HashMap::new(),
            &HashMap::new(),
            &view(vec![assigned(id, 1, false)]),
        );
        assert!(plan.is_empty());
    }
}
