//! Test-result metrics under `<prefix>.junit.`.

use wjp_core::sanitize::sanitize_test_category;
use wjp_core::{MetricRecord, TestReport};

use super::RunContext;
use crate::builder::{TAG_BUILD_NUMBER, TAG_JOB_NAME, TAG_TEST_STATUS};

/// Aggregate duration and counts for the job, then one record per test in
/// failed, skipped, passed order.
///
/// Aggregates carry parameter tags only. Per-test records add the job name,
/// build number and test status.
pub fn test_records(ctx: &RunContext<'_>, report: &TestReport) -> Vec<MetricRecord> {
    let builder = ctx.builder;
    let mut tags = builder.tags();
    ctx.add_parameter_tags(&mut tags);

    let job_metric = format!("junit.{}", ctx.job);
    let mut records = vec![builder.build(&job_metric, report.duration_secs * 1000.0, tags.clone())];
    let counts = [
        ("skip", report.skipped),
        ("fail", report.failed),
        ("total", report.total),
        ("pass", report.passed()),
    ];
    for (kind, count) in counts {
        records.push(builder.build(
            &format!("{job_metric}.{kind}count"),
            count as f64,
            tags.clone(),
        ));
    }

    tags.insert(TAG_JOB_NAME, ctx.job.as_str());
    tags.insert(TAG_BUILD_NUMBER, ctx.run.build_id.as_str());
    for (outcome, case) in report.outcomes() {
        let mut case_tags = tags.clone();
        case_tags.insert(TAG_TEST_STATUS, outcome.as_str());
        records.push(builder.build(
            &format!("junit.{}", sanitize_test_category(&case.full_name)),
            case.duration_secs * 1000.0,
            case_tags,
        ));
    }
    records
}
