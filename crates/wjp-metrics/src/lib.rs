//! Metric passes for completed runs.
//!
//! Pairs scope starts with scope ends over a run's trace ([`matcher`]),
//! decides which scopes are reported ([`classify`]), assembles records
//! ([`builder`], [`passes`]) and hands them to a sink ([`emit`]).
//! [`RunReporter`] ties the passes together for one run.

pub mod builder;
pub mod classify;
pub mod clock;
pub mod config;
pub mod emit;
pub mod error;
pub mod matcher;
pub mod passes;
pub mod reporter;

pub use builder::MetricRecordBuilder;
pub use classify::{classify_scope, ClassifiedScope, ScopeKind};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{JobProperty, MetricsConfig};
pub use emit::{emit, EmissionSummary};
pub use error::{ConfigError, TraceError};
pub use matcher::{MatchedScope, ScopeMatcher};
pub use passes::step::StepEvent;
pub use reporter::{PassKind, PassRecords, PassSummary, RunRecords, RunReport, RunReporter};
