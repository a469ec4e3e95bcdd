//! Error types for the metric passes.

use std::path::PathBuf;

use wjp_core::{CoreError, NodeId};

/// A run's trace could not be turned into scope metrics.
///
/// Fatal for the pipeline pass of that run only.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// A scope start was reached with no pending scope end: the node order
    /// did not present ends before their starts.
    #[error("scope start {node} has no pending scope end")]
    UnmatchedScopeStart { node: NodeId },

    /// The trace nodes do not form a valid graph.
    #[error("invalid trace: {0}")]
    InvalidTrace(#[from] CoreError),
}

/// Configuration could not be loaded or failed validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("proxy port must be between 0 and 65535, got {0}")]
    InvalidPort(u32),

    #[error("flush interval must be at least 1 minute, got {0}")]
    InvalidFlushInterval(u64),

    /// Parameter tags could crowd out the fixed tags of a record.
    #[error(
        "tag limits leave no room for fixed tags: max_tags {max_tags} must be at least \
         max_parameter_tags {max_parameter_tags} + {fixed}"
    )]
    InvalidTagLimits {
        max_tags: usize,
        max_parameter_tags: usize,
        fixed: usize,
    },
}
