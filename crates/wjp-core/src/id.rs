//! Stable identifiers for trace nodes.
//!
//! The trace producer assigns every node an id that is unique within one run.
//! [`NodeId`] wraps it so it cannot be confused with the graph's internal
//! `NodeIndex`, which is only meaningful inside one [`TraceGraph`].
//!
//! [`TraceGraph`]: crate::graph::TraceGraph

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one trace node, as assigned by the trace producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(raw: u32) -> Self {
        NodeId(raw)
    }
}
