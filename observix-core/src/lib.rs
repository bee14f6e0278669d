//! Shared Observix types
//!
//! Domain types and wire DTOs used by the control plane, agent, indexer,
//! client, and CLI. This crate is the bottom of the dependency order and
//! deliberately contains no I/O.

pub mod domain;
pub mod dto;

pub use domain::event::Event;
pub use domain::pipeline::{
    DestinationSpec, Pipeline, PipelineSpec, ProcessorSpec, SourceSpec, SpecError,
};
