//! Observix Control Plane
//!
//! Authoritative catalog for pipelines, assignments, and agent liveness, and
//! the assignment-view endpoint each agent polls.
//!
//! Layering:
//! - `api`: axum handlers and the HTTP error contract
//! - `service`: validation, version bumps, revision hashing, liveness
//! - `repository`: sqlx queries against the embedded SQLite store

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
