//! Stage and parallel-branch metrics from a run's trace.

use tracing::warn;
use wjp_core::{MetricRecord, TraceGraph, TraceNode};

use super::RunContext;
use crate::classify::classify_scope;
use crate::error::TraceError;
use crate::matcher::ScopeMatcher;

/// Records produced from a trace, plus the error that stopped the walk.
///
/// Records matched before a failure are kept.
#[derive(Debug, Default)]
pub struct PipelineRecords {
    pub records: Vec<MetricRecord>,
    pub error: Option<TraceError>,
}

/// One record per stage or parallel branch, in walk order.
///
/// The iterator ends after the first [`TraceError`].
pub fn scope_records<'a, I>(
    ctx: &'a RunContext<'a>,
    nodes: I,
) -> impl Iterator<Item = Result<MetricRecord, TraceError>> + 'a
where
    I: IntoIterator<Item = &'a TraceNode> + 'a,
    I::IntoIter: 'a,
{
    ScopeMatcher::new(nodes).filter_map(move |matched| match matched {
        Ok(scope) => classify_scope(scope.start).map(|classified| {
            Ok(ctx
                .builder
                .scope_record(&ctx.job, &scope, &classified, &ctx.run.build_id))
        }),
        Err(err) => Some(Err(err)),
    })
}

/// Builds the trace graph from producer nodes, walks it and collects scope
/// records until the walk ends or fails.
pub fn pipeline_records(ctx: &RunContext<'_>, nodes: &[TraceNode]) -> PipelineRecords {
    let trace = match TraceGraph::from_nodes(nodes.iter().cloned()) {
        Ok(trace) => trace,
        Err(err) => {
            let error = TraceError::from(err);
            warn!(job = %ctx.job, build = %ctx.run.build_id, error = %error, "skipping pipeline metrics");
            return PipelineRecords {
                records: Vec::new(),
                error: Some(error),
            };
        }
    };

    let mut out = PipelineRecords::default();
    for record in scope_records(ctx, trace.walk()) {
        match record {
            Ok(record) => out.records.push(record),
            Err(error) => {
                warn!(job = %ctx.job, build = %ctx.run.build_id, error = %error, "malformed trace, stopping pipeline metrics");
                out.error = Some(error);
                break;
            }
        }
    }
    out
}
