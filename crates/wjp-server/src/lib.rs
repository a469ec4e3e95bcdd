//! HTTP host layer for run-completion metrics.
//!
//! Accepts run-completion and timed-step events from a build host, keeps the
//! metrics configuration and per-job properties, and owns the lifecycle of
//! the sink that delivers records to a Wavefront proxy.

pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
