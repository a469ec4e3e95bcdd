//! Timed-block metrics: `<prefix>.step.<name>`.

use serde::{Deserialize, Serialize};
use wjp_core::sanitize::sanitize_step_category;
use wjp_core::MetricRecord;

use crate::builder::{MetricRecordBuilder, TAG_BUILD_NUMBER, TAG_JOB_NAME};

/// A named block of a running build finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Job name as shown to users, unsanitized.
    pub job_name: String,
    pub build_number: String,
    /// User-supplied metric name; may be empty.
    #[serde(default)]
    pub metric_name: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl StepEvent {
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

pub fn step_record(builder: &MetricRecordBuilder, event: &StepEvent) -> MetricRecord {
    let tags = builder
        .tags()
        .with(TAG_JOB_NAME, event.job_name.as_str())
        .with(TAG_BUILD_NUMBER, event.build_number.as_str());
    builder.build(
        &format!("step.{}", sanitize_step_category(&event.metric_name)),
        event.duration_ms() as f64,
        tags,
    )
}
