//! Assembles [`MetricRecord`]s under the job metrics prefix.

use wjp_core::{MetricRecord, TagLimits, TagSet};

use crate::classify::ClassifiedScope;
use crate::config::MetricsConfig;
use crate::matcher::MatchedScope;

pub const TAG_STATUS: &str = "Status";
pub const TAG_BUILD_NUMBER: &str = "Build Number";
pub const TAG_JOB_NAME: &str = "Job Name";
pub const TAG_TEST_STATUS: &str = "Test Status";

/// Largest fixed tag set any record carries: a per-test record has
/// `Job Name`, `Build Number` and `Test Status` on top of parameter tags.
pub const MAX_FIXED_TAGS: usize = 3;

/// Shared settings for every record built during one emission.
#[derive(Debug, Clone)]
pub struct MetricRecordBuilder {
    prefix: String,
    source: String,
    timestamp_ms: i64,
    limits: TagLimits,
}

impl MetricRecordBuilder {
    pub fn new(prefix: &str, source: &str, timestamp_ms: i64, limits: TagLimits) -> Self {
        MetricRecordBuilder {
            prefix: prefix.to_string(),
            source: source.to_string(),
            timestamp_ms,
            limits,
        }
    }

    /// Builder using the job prefix, source and tag limits from `config`.
    pub fn from_config(config: &MetricsConfig, timestamp_ms: i64) -> Self {
        Self::new(
            &config.job_metrics_prefix,
            config.source_name(),
            timestamp_ms,
            config.tag_limits,
        )
    }

    /// `<prefix>.<suffix>`, or just the suffix when the prefix is empty.
    pub fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}.{}", self.prefix, suffix)
        }
    }

    /// An empty tag set with this builder's limits.
    pub fn tags(&self) -> TagSet {
        TagSet::with_limits(self.limits)
    }

    /// `{Status, Build Number}`.
    pub fn status_tags(&self, status: &str, build_id: &str) -> TagSet {
        self.tags()
            .with(TAG_STATUS, status)
            .with(TAG_BUILD_NUMBER, build_id)
    }

    pub fn build(&self, suffix: &str, value: f64, tags: TagSet) -> MetricRecord {
        MetricRecord::new(
            self.metric_name(suffix),
            value,
            self.timestamp_ms,
            self.source.as_str(),
            tags,
        )
    }

    /// `<prefix>.<job>.<stage|parallel>.<name>` with the scope's duration.
    pub fn scope_record(
        &self,
        job: &str,
        scope: &MatchedScope<'_>,
        classified: &ClassifiedScope,
        build_id: &str,
    ) -> MetricRecord {
        self.build(
            &format!("{job}.{}.{}", classified.kind.category(), classified.name),
            scope.duration_ms as f64,
            self.status_tags(scope.status.as_str(), build_id),
        )
    }
}
