//! Coverage metrics under `<prefix>.<job>.jacoco.`.

use wjp_core::{CoverageReport, MetricRecord};

use super::RunContext;

/// Five records per category present in the report: percentage, minimum,
/// maximum, covered and total.
pub fn coverage_records(ctx: &RunContext<'_>, report: &CoverageReport) -> Vec<MetricRecord> {
    let tags = ctx
        .builder
        .status_tags(ctx.run.result.as_str(), &ctx.run.build_id);

    let mut records = Vec::with_capacity(report.entries.len() * 5);
    for entry in &report.entries {
        let base = format!("{}.jacoco.{}", ctx.job, entry.category.metric_stem());
        let figures = [
            (None, entry.percentage),
            (Some("minimum"), entry.minimum),
            (Some("maximum"), entry.maximum),
            (Some("covered"), entry.covered as f64),
            (Some("total"), entry.total as f64),
        ];
        for (suffix, value) in figures {
            let name = match suffix {
                Some(suffix) => format!("{base}.{suffix}"),
                None => base.clone(),
            };
            records.push(ctx.builder.build(&name, value, tags.clone()));
        }
    }
    records
}
