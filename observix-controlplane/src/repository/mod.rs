//! Repository Module
//!
//! sqlx queries against the embedded store, one submodule per resource.

pub mod agent;
pub mod assignment;
pub mod pipeline;
