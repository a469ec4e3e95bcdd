//! Core data model for turning a finished run into Wavefront metrics.
//!
//! Everything in this crate is pure: trace nodes and the trace graph, the
//! name sanitizer, tag sets, terminal status derivation and the metric record
//! itself. Traversal, classification and emission live in `wjp-metrics`.

pub mod coverage;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod record;
pub mod run;
pub mod sanitize;
pub mod status;
pub mod tags;
pub mod test_report;

// Re-export commonly used types
pub use coverage::{CoverageCategory, CoverageEntry, CoverageReport};
pub use error::CoreError;
pub use graph::TraceGraph;
pub use id::NodeId;
pub use node::{ErrorInfo, Marker, NodeKind, TraceNode};
pub use record::{MetricRecord, MAX_METRIC_NAME_LEN};
pub use run::{Parameter, RunEvent, RunResult, RunSummary};
pub use status::ScopeStatus;
pub use tags::{TagLimits, TagSet};
pub use test_report::{TestCase, TestOutcome, TestReport};
