//! Core error types for wjp-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of building a trace graph from producer-supplied nodes.

use crate::id::NodeId;
use thiserror::Error;

/// Core errors produced by the wjp-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The same node id was supplied twice for one trace.
    #[error("duplicate trace node: NodeId({id})")]
    DuplicateNode { id: NodeId },

    /// A node names a parent that is not part of the trace.
    #[error("trace node NodeId({node}) references unknown parent NodeId({parent})")]
    UnknownParent { node: NodeId, parent: NodeId },

    /// A node id was not found in the trace graph.
    #[error("trace node not found: NodeId({id})")]
    NodeNotFound { id: NodeId },
}
