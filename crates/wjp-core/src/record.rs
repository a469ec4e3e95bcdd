//! The emission unit: one named, tagged, timestamped value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tags::TagSet;

/// Metric names at or above this many characters are not sent.
pub const MAX_METRIC_NAME_LEN: usize = 255;

/// One metric data point, ready for a sink.
///
/// Built once, never mutated, handed to a sink and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Fully qualified dotted metric name.
    pub name: String,
    pub value: f64,
    /// Epoch milliseconds.
    pub timestamp_ms: i64,
    /// Source identifier (host or configured source).
    pub source: String,
    pub tags: TagSet,
}

impl MetricRecord {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        timestamp_ms: i64,
        source: impl Into<String>,
        tags: TagSet,
    ) -> Self {
        MetricRecord {
            name: name.into(),
            value,
            timestamp_ms,
            source: source.into(),
            tags,
        }
    }

    /// Returns `true` if the name is too long to be accepted by the backend.
    pub fn name_exceeds_limit(&self) -> bool {
        self.name.chars().count() >= MAX_METRIC_NAME_LEN
    }
}

/// Human-readable rendering used in tests and logs:
/// `<name> <value> source=<source> <Tag-Key>=<value> ...`
///
/// Spaces in tag keys become `-`, the way the backend shows them. The
/// timestamp is omitted so renderings are stable.
impl fmt::Display for MetricRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} source={}", self.name, self.value, self.source)?;
        for (key, value) in self.tags.iter() {
            write!(f, " {}={}", key.replace(' ', "-"), value)?;
        }
        Ok(())
    }
}
