//! Metric passes over one completed run.
//!
//! Each pass is independent: a failure in one never prevents the others.
//!
//! - [`job`]: the run's overall duration
//! - [`pipeline`]: one record per stage and parallel branch
//! - [`junit`]: aggregate and per-test results
//! - [`coverage`]: per-category coverage figures
//! - [`step`]: timed blocks reported while the run is in progress

pub mod coverage;
pub mod job;
pub mod junit;
pub mod pipeline;
pub mod step;

use tracing::debug;
use wjp_core::sanitize::job_category;
use wjp_core::{RunSummary, TagSet};

use crate::builder::MetricRecordBuilder;
use crate::config::{JobProperty, MetricsConfig};

/// Tag key prefix for run parameters.
pub const PARAMETER_TAG_PREFIX: &str = "p_";

/// Everything a pass needs to know about the run being reported.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub run: &'a RunSummary,
    /// Sanitized job segment.
    pub job: String,
    pub builder: &'a MetricRecordBuilder,
    pub config: &'a MetricsConfig,
    pub property: Option<&'a JobProperty>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        run: &'a RunSummary,
        builder: &'a MetricRecordBuilder,
        config: &'a MetricsConfig,
        property: Option<&'a JobProperty>,
    ) -> Self {
        RunContext {
            run,
            job: job_category(&run.job_full_name),
            builder,
            config,
            property,
        }
    }

    /// Adds `p_<name>` tags for the run's parameters, subject to the job's
    /// opt-in and the tag limits. Returns how many were added.
    pub fn add_parameter_tags(&self, tags: &mut TagSet) -> usize {
        let candidates = parameter_candidates(self.run, self.config, self.property);
        if candidates.is_empty() {
            return 0;
        }
        tags.extend_bounded(candidates)
    }

    pub fn junit_enabled(&self) -> bool {
        self.config.enable_junit_for_all_jobs || self.property.is_some_and(|p| p.enable_junit)
    }

    pub fn jacoco_enabled(&self) -> bool {
        self.config.enable_jacoco_for_all_jobs || self.property.is_some_and(|p| p.enable_jacoco)
    }
}

/// The `(tag key, value)` pairs a run's parameters contribute, before
/// admission limits.
///
/// A job property that enables parameters selects its listed names, or all
/// parameters when the list is empty. Without it the global switch decides
/// between all parameters and none. Absent and empty values are skipped.
pub fn parameter_candidates(
    run: &RunSummary,
    config: &MetricsConfig,
    property: Option<&JobProperty>,
) -> Vec<(String, String)> {
    if run.parameters.is_empty() {
        debug!(job = %run.job_full_name, "run has no parameters");
        return Vec::new();
    }

    match property.filter(|p| p.enable_parameters) {
        Some(property) => {
            let selected = property.selected_parameters();
            if selected.is_empty() {
                all_parameters(run)
            } else {
                selected
                    .into_iter()
                    .filter_map(|name| run.parameter(name))
                    .filter_map(|p| Some(tag_pair(&p.name, p.non_empty_value()?)))
                    .collect()
            }
        }
        None if config.enable_parameters_for_all_jobs => all_parameters(run),
        None => Vec::new(),
    }
}

fn all_parameters(run: &RunSummary) -> Vec<(String, String)> {
    run.parameters
        .iter()
        .filter_map(|p| Some(tag_pair(&p.name, p.non_empty_value()?)))
        .collect()
}

fn tag_pair(name: &str, value: &str) -> (String, String) {
    (format!("{PARAMETER_TAG_PREFIX}{name}"), value.to_string())
}
