//! MetricsService: owns the configuration, the reporter and the sink.
//!
//! The sink is opened on first use through the injected [`SinkFactory`] and
//! dropped whenever the configuration changes, so the next emission talks
//! to the new endpoint. Methods that send are blocking; handlers call them
//! from a blocking task.

use std::sync::Arc;

use tracing::{debug, info, warn};
use wjp_core::RunEvent;
use wjp_metrics::{
    Clock, EmissionSummary, JobProperty, MetricsConfig, RunReport, RunReporter, StepEvent,
};
use wjp_sink::{MetricSink, SinkFactory};

use crate::error::ApiError;

pub struct MetricsService {
    reporter: RunReporter,
    clock: Arc<dyn Clock>,
    factory: Arc<dyn SinkFactory>,
    sink: Option<Box<dyn MetricSink + Send>>,
}

impl MetricsService {
    pub fn new(config: MetricsConfig, factory: Arc<dyn SinkFactory>, clock: Arc<dyn Clock>) -> Self {
        MetricsService {
            reporter: RunReporter::with_clock(config, Arc::clone(&clock)),
            clock,
            factory,
            sink: None,
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        self.reporter.config()
    }

    /// Returns `true` while a sink is open.
    pub fn has_open_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Validates and installs a new configuration, closing the current sink.
    pub fn update_config(&mut self, config: MetricsConfig) -> Result<MetricsConfig, ApiError> {
        let config = config.normalized()?;
        self.close_sink();
        self.reporter = RunReporter::with_clock(config.clone(), Arc::clone(&self.clock));
        info!(
            proxy = %config.proxy_hostname,
            port = config.proxy_port,
            prefix = %config.job_metrics_prefix,
            "metrics configuration updated"
        );
        Ok(config)
    }

    /// Reports a completed run. Returns `None` when no proxy is configured.
    pub fn report_run(
        &mut self,
        event: &RunEvent,
        property: Option<&JobProperty>,
    ) -> Result<Option<RunReport>, ApiError> {
        if !self.config().is_configured() {
            debug!(job = %event.run.job_full_name, "no proxy configured, not emitting");
            return Ok(None);
        }
        let reporter = self.reporter.clone();
        let sink = self.sink()?;
        Ok(Some(reporter.report(event, property, sink)))
    }

    /// Reports a finished timed step. Returns `None` when no proxy is
    /// configured.
    pub fn report_step(&mut self, event: &StepEvent) -> Result<Option<EmissionSummary>, ApiError> {
        if !self.config().is_configured() {
            return Ok(None);
        }
        let reporter = self.reporter.clone();
        let sink = self.sink()?;
        let summary = reporter.report_step(event, sink);
        self.flush_sink();
        Ok(Some(summary))
    }

    /// Flushes and drops the current sink, if any.
    pub fn close_sink(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(err) = sink.close() {
                warn!(error = %err, "failed to close metrics sink");
            }
        }
    }

    fn sink(&mut self) -> Result<&mut (dyn MetricSink + Send + 'static), ApiError> {
        if self.sink.is_none() {
            let endpoint = self
                .config()
                .endpoint()
                .ok_or_else(|| ApiError::SinkUnavailable("proxy endpoint is not configured".into()))?;
            debug!(%endpoint, "opening metrics sink");
            self.sink = Some(self.factory.open(&endpoint)?);
        }
        self.sink
            .as_deref_mut()
            .ok_or_else(|| ApiError::InternalError("sink missing after open".into()))
    }

    fn flush_sink(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.flush() {
                warn!(error = %err, "failed to flush metrics sink");
            }
        }
    }
}
