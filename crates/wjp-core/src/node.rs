//! Trace nodes: the recorded events of one run's execution trace.
//!
//! A run's trace is a DAG of nodes. Scopes (stages, parallel branches, the
//! run itself) are bracketed by a [`NodeKind::ScopeStart`] node and a matching
//! [`NodeKind::ScopeEnd`] node. Everything else is [`NodeKind::Other`].
//!
//! Nodes are produced once per run by the trace producer and are never
//! mutated afterwards; this crate only reads them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::NodeId;

/// Structural role of a trace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Opens a scope.
    ScopeStart,
    /// Closes the innermost open scope.
    ScopeEnd,
    /// Any other step in the trace.
    Other,
}

/// Markers attached to a node by the trace producer.
///
/// A stage body carries a [`Marker::Label`]. A parallel branch start carries
/// all three: a label, a thread name and [`Marker::ParallelBranch`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Marker {
    /// A user-visible label (stage name, branch name).
    Label(String),
    /// The node opens a named thread of execution.
    ThreadName(String),
    /// The node opens one branch of a parallel step.
    ParallelBranch,
}

/// Error information recorded on a scope end that did not succeed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable cause. Absent when the scope was cancelled rather than
    /// failed.
    #[serde(default)]
    pub cause: Option<String>,
}

impl ErrorInfo {
    /// An error with a human-readable cause.
    pub fn failure(cause: impl Into<String>) -> Self {
        ErrorInfo {
            cause: Some(cause.into()),
        }
    }

    /// An error without a cause (operator cancellation).
    pub fn cancelled() -> Self {
        ErrorInfo { cause: None }
    }
}

/// One node of a run's execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceNode {
    /// Producer-assigned identity, unique within the run.
    pub id: NodeId,
    /// Structural role.
    pub kind: NodeKind,
    /// Display name as shown to users (may be empty).
    #[serde(default)]
    pub display_name: String,
    /// Epoch milliseconds at which the node started.
    pub start_time_ms: i64,
    /// Present only on scope ends that did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub markers: SmallVec<[Marker; 2]>,
    /// Nodes that executed immediately before this one.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub parents: SmallVec<[NodeId; 2]>,
}

impl TraceNode {
    /// Creates a node with no markers, parents or error.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, display_name: &str, start_time_ms: i64) -> Self {
        TraceNode {
            id: id.into(),
            kind,
            display_name: display_name.to_string(),
            start_time_ms,
            error: None,
            markers: SmallVec::new(),
            parents: SmallVec::new(),
        }
    }

    /// Convenience: a scope start node.
    pub fn scope_start(id: impl Into<NodeId>, display_name: &str, start_time_ms: i64) -> Self {
        Self::new(id, NodeKind::ScopeStart, display_name, start_time_ms)
    }

    /// Convenience: a scope end node.
    pub fn scope_end(id: impl Into<NodeId>, start_time_ms: i64) -> Self {
        Self::new(id, NodeKind::ScopeEnd, "", start_time_ms)
    }

    /// Convenience: a plain step node.
    pub fn step(id: impl Into<NodeId>, display_name: &str, start_time_ms: i64) -> Self {
        Self::new(id, NodeKind::Other, display_name, start_time_ms)
    }

    /// Adds a marker.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Adds a parent edge.
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Records error information.
    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    /// Returns `true` if the node carries a label marker.
    pub fn has_label(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, Marker::Label(_)))
    }

    /// Returns `true` if the node carries a thread-name marker.
    pub fn has_thread_name(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, Marker::ThreadName(_)))
    }

    /// Returns `true` if the node opens a parallel branch.
    pub fn is_parallel_branch(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, Marker::ParallelBranch))
    }

    /// Returns the first label, if any.
    pub fn label(&self) -> Option<&str> {
        self.markers.iter().find_map(|m| match m {
            Marker::Label(label) => Some(label.as_str()),
            _ => None,
        })
    }
}
