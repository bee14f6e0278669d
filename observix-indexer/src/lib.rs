//! Observix Indexer
//!
//! Stateless normalization service: converts a batch of raw log lines into
//! structured documents under a named profile. Horizontally scalable; no
//! per-request state.

pub mod api;
pub mod config;
pub mod profiles;
