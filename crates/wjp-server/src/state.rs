//! Application state shared by all handlers.
//!
//! The [`MetricsService`] sits behind `Arc<tokio::sync::Mutex<>>` so handlers
//! await the lock without blocking the runtime; emission itself runs on a
//! blocking task holding an owned guard. Job properties live in a `DashMap`
//! and never wait on the service lock.

use std::sync::Arc;

use dashmap::DashMap;
use wjp_metrics::{Clock, JobProperty, MetricsConfig, SystemClock};
use wjp_sink::{ProxySinkFactory, SinkFactory};

use crate::error::ApiError;
use crate::service::MetricsService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<tokio::sync::Mutex<MetricsService>>,
    /// Per-job opt-ins, keyed by job full name.
    pub job_properties: Arc<DashMap<String, JobProperty>>,
}

impl AppState {
    /// State that sends to a real Wavefront proxy.
    pub fn new(config: MetricsConfig) -> Result<Self, ApiError> {
        Self::with_sink_factory(config, Arc::new(ProxySinkFactory::new()), Arc::new(SystemClock))
    }

    /// State with an injected sink factory and clock (for testing).
    pub fn with_sink_factory(
        config: MetricsConfig,
        factory: Arc<dyn SinkFactory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApiError> {
        let config = config.normalized()?;
        let service = MetricsService::new(config, factory, clock);
        Ok(AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            job_properties: Arc::new(DashMap::new()),
        })
    }

    /// Looks up a job's property, cloned out of the map.
    pub fn job_property(&self, job: &str) -> Option<JobProperty> {
        self.job_properties.get(job).map(|entry| entry.value().clone())
    }
}
