//! Runs every metric pass for a completed run.
//!
//! The job pass always runs. The pipeline pass runs when the run carries a
//! trace; a malformed trace stops that pass only. Test and coverage passes
//! run when enabled globally or by the job's property and the run carries
//! the data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wjp_core::{MetricRecord, RunEvent};
use wjp_sink::MetricSink;

use crate::builder::MetricRecordBuilder;
use crate::clock::{Clock, SystemClock};
use crate::config::{JobProperty, MetricsConfig};
use crate::emit::{emit, EmissionSummary};
use crate::error::TraceError;
use crate::passes::coverage::coverage_records;
use crate::passes::job::job_record;
use crate::passes::junit::test_records;
use crate::passes::pipeline::pipeline_records;
use crate::passes::step::{step_record, StepEvent};
use crate::passes::RunContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Job,
    Pipeline,
    Tests,
    Coverage,
}

/// Records built by one pass.
#[derive(Debug)]
pub struct PassRecords {
    pub pass: PassKind,
    pub records: Vec<MetricRecord>,
    /// Set when the pass stopped early.
    pub error: Option<TraceError>,
}

/// Records built for one run, grouped by pass.
#[derive(Debug)]
pub struct RunRecords {
    /// Sanitized job segment.
    pub job: String,
    pub build_id: String,
    pub passes: Vec<PassRecords>,
}

impl RunRecords {
    pub fn records(&self) -> impl Iterator<Item = &MetricRecord> {
        self.passes.iter().flat_map(|p| p.records.iter())
    }

    pub fn pass(&self, kind: PassKind) -> Option<&PassRecords> {
        self.passes.iter().find(|p| p.pass == kind)
    }
}

/// Emission outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub pass: PassKind,
    #[serde(flatten)]
    pub summary: EmissionSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Emission outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub job: String,
    pub build_id: String,
    pub passes: Vec<PassSummary>,
    /// Set when the final flush failed. Records counted as `sent` may then
    /// not have reached the proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_error: Option<String>,
}

impl RunReport {
    pub fn totals(&self) -> EmissionSummary {
        let mut total = EmissionSummary::default();
        for pass in &self.passes {
            total.merge(pass.summary);
        }
        total
    }

    pub fn pass(&self, kind: PassKind) -> Option<&PassSummary> {
        self.passes.iter().find(|p| p.pass == kind)
    }
}

/// Turns run events into records and sends them.
#[derive(Clone)]
pub struct RunReporter {
    config: MetricsConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RunReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunReporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RunReporter {
    pub fn new(config: MetricsConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MetricsConfig, clock: Arc<dyn Clock>) -> Self {
        RunReporter { config, clock }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Builds the records of every applicable pass without sending them.
    pub fn records(&self, event: &RunEvent, property: Option<&JobProperty>) -> RunRecords {
        let builder = MetricRecordBuilder::from_config(&self.config, self.clock.now_ms());
        let ctx = RunContext::new(&event.run, &builder, &self.config, property);
        let mut passes = vec![PassRecords {
            pass: PassKind::Job,
            records: vec![job_record(&ctx)],
            error: None,
        }];

        if let Some(nodes) = &event.trace {
            let pipeline = pipeline_records(&ctx, nodes);
            passes.push(PassRecords {
                pass: PassKind::Pipeline,
                records: pipeline.records,
                error: pipeline.error,
            });
        }

        match &event.tests {
            Some(report) if ctx.junit_enabled() => passes.push(PassRecords {
                pass: PassKind::Tests,
                records: test_records(&ctx, report),
                error: None,
            }),
            Some(_) => debug!(job = %ctx.job, "test metrics not enabled for job"),
            None => {}
        }

        match &event.coverage {
            Some(report) if ctx.jacoco_enabled() => passes.push(PassRecords {
                pass: PassKind::Coverage,
                records: coverage_records(&ctx, report),
                error: None,
            }),
            Some(_) => debug!(job = %ctx.job, "coverage metrics not enabled for job"),
            None => {}
        }

        RunRecords {
            job: ctx.job.clone(),
            build_id: event.run.build_id.clone(),
            passes,
        }
    }

    /// Builds and sends every pass, then flushes the sink once. Returns
    /// per-pass counts.
    pub fn report<S>(&self, event: &RunEvent, property: Option<&JobProperty>, sink: &mut S) -> RunReport
    where
        S: MetricSink + ?Sized,
    {
        let built = self.records(event, property);
        let passes = built
            .passes
            .iter()
            .map(|pass| PassSummary {
                pass: pass.pass,
                summary: emit(&pass.records, &mut *sink),
                error: pass.error.as_ref().map(ToString::to_string),
            })
            .collect();
        let flush_error = match sink.flush() {
            Ok(()) => None,
            Err(err) => {
                warn!(job = %built.job, error = %err, "failed to flush run metrics");
                Some(err.to_string())
            }
        };
        let report = RunReport {
            job: built.job,
            build_id: built.build_id,
            passes,
            flush_error,
        };
        let totals = report.totals();
        info!(
            job = %report.job,
            build = %report.build_id,
            sent = totals.sent,
            dropped = totals.dropped,
            failed = totals.failed,
            "run metrics emitted"
        );
        report
    }

    pub fn step_record(&self, event: &StepEvent) -> MetricRecord {
        let builder = MetricRecordBuilder::from_config(&self.config, self.clock.now_ms());
        step_record(&builder, event)
    }

    pub fn report_step<S>(&self, event: &StepEvent, sink: &mut S) -> EmissionSummary
    where
        S: MetricSink + ?Sized,
    {
        let record = self.step_record(event);
        emit(std::iter::once(&record), sink)
    }
}
