//! Observix Agent
//!
//! Edge process hosting the pipelines currently assigned to it. Each pipeline
//! is three cooperating tasks (source, batcher+processor, destination) around
//! one bounded queue; a reconciler converges the running set against the
//! control plane every poll interval.
//!
//! Failure isolation is structural: a pipeline owns its own tasks, queue, and
//! stats block, so a sick pipeline cannot starve another.

pub mod batcher;
pub mod config;
pub mod destinations;
pub mod pipeline;
pub mod processors;
pub mod runtime;
pub mod scheduler;
pub mod sources;
pub mod stats;

pub use runtime::AgentRuntime;
