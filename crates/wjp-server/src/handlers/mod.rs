//! HTTP handler modules.
//!
//! Handlers parse requests, take the service lock and delegate to
//! [`MetricsService`](crate::service::MetricsService). Anything that talks to
//! the sink runs on a blocking task.

pub mod config;
pub mod health;
pub mod jobs;
pub mod runs;
