//! Hands records to a sink one by one.
//!
//! Delivery is best effort: an oversized name drops that record, a send
//! failure is logged, and the remaining records are still attempted.

use serde::{Deserialize, Serialize};
use tracing::warn;
use wjp_core::{MetricRecord, MAX_METRIC_NAME_LEN};
use wjp_sink::MetricSink;

/// Outcome counts of one emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSummary {
    /// Accepted by the sink. For a buffering sink this is not yet delivery;
    /// see `RunReport::flush_error`.
    pub sent: usize,
    /// Not sent because the name was too long.
    pub dropped: usize,
    /// Sink returned an error.
    pub failed: usize,
}

impl EmissionSummary {
    pub fn attempted(&self) -> usize {
        self.sent + self.dropped + self.failed
    }

    pub fn merge(&mut self, other: EmissionSummary) {
        self.sent += other.sent;
        self.dropped += other.dropped;
        self.failed += other.failed;
    }
}

pub fn emit<'r, S>(records: impl IntoIterator<Item = &'r MetricRecord>, sink: &mut S) -> EmissionSummary
where
    S: MetricSink + ?Sized,
{
    let mut summary = EmissionSummary::default();
    for record in records {
        if record.name_exceeds_limit() {
            warn!(
                name = %record.name,
                limit = MAX_METRIC_NAME_LEN,
                "metric name is too long, not sending"
            );
            summary.dropped += 1;
            continue;
        }
        match sink.send(record) {
            Ok(()) => summary.sent += 1,
            Err(err) => {
                warn!(name = %record.name, error = %err, "failed to send metric");
                summary.failed += 1;
            }
        }
    }
    summary
}
