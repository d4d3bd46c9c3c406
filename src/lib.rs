//! Ranking engine and service for prioritizing manual QA tests for
//! automation. The `triage` module holds the engine; `config`, `telemetry`,
//! and `error` carry the service plumbing around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod triage;
