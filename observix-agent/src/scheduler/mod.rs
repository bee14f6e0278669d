//! Assignment reconciliation
//!
//! Polls the control plane and converges the set of running pipelines to
//! match the assignment view.

mod plan;
mod reconciler;

pub use plan::{ReconcilePlan, compute_plan};
pub use reconciler::Reconciler;
