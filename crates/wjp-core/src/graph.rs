//! TraceGraph: a run's execution trace as a DAG, plus the end-before-start
//! walk that the scope matcher depends on.
//!
//! Edges point from a node to the nodes that executed after it (parent to
//! child). A parallel step forks at its start node (one child per branch)
//! and joins at its end node (one parent per branch).
//!
//! # Walk order contract
//!
//! [`TraceGraph::walk`] starts at the heads (nodes without children) and
//! yields a node only after every one of its children has been yielded. The
//! worklist is LIFO, so once a branch of a fork is entered it is drained down
//! to the fork before a sibling branch is started. For traces made of nested
//! blocks this presents every scope end before the scope start that encloses
//! it, and scopes never interleave: exactly the bracket order a LIFO matcher
//! needs.

use indexmap::IndexMap;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::{Directed, Direction};

use crate::error::CoreError;
use crate::id::NodeId;
use crate::node::TraceNode;

/// The execution trace of one run.
#[derive(Debug, Clone, Default)]
pub struct TraceGraph {
    graph: StableGraph<TraceNode, (), Directed, u32>,
    /// Producer id to graph index.
    index: IndexMap<NodeId, NodeIndex<u32>>,
}

impl TraceGraph {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a trace from nodes in any order.
    ///
    /// All nodes are inserted first, then every `parents` entry becomes an
    /// edge. Errors on duplicate ids and on parents that are not in the set.
    pub fn from_nodes(nodes: impl IntoIterator<Item = TraceNode>) -> Result<Self, CoreError> {
        let mut trace = TraceGraph::new();
        let mut pending_edges = Vec::new();

        for node in nodes {
            let id = node.id;
            if trace.index.contains_key(&id) {
                return Err(CoreError::DuplicateNode { id });
            }
            pending_edges.extend(node.parents.iter().map(|&parent| (parent, id)));
            let idx = trace.graph.add_node(node);
            trace.index.insert(id, idx);
        }

        for (parent, child) in pending_edges {
            let Some(&from) = trace.index.get(&parent) else {
                return Err(CoreError::UnknownParent {
                    node: child,
                    parent,
                });
            };
            let to = trace.index[&child];
            trace.graph.add_edge(from, to, ());
        }

        Ok(trace)
    }

    /// Appends a node whose parents are already in the trace.
    pub fn add_node(&mut self, node: TraceNode) -> Result<NodeId, CoreError> {
        let id = node.id;
        if self.index.contains_key(&id) {
            return Err(CoreError::DuplicateNode { id });
        }
        let mut parents = Vec::with_capacity(node.parents.len());
        for &parent in &node.parents {
            let idx = self
                .index
                .get(&parent)
                .copied()
                .ok_or(CoreError::UnknownParent { node: id, parent })?;
            parents.push(idx);
        }

        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        for parent in parents {
            self.graph.add_edge(parent, idx, ());
        }
        Ok(id)
    }

    /// Looks up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&TraceNode> {
        self.index
            .get(&id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Returns the ids of the nodes that ran directly after `id`.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, CoreError> {
        let idx = *self.index.get(&id).ok_or(CoreError::NodeNotFound { id })?;
        let mut children: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|child| self.graph[child].id)
            .collect();
        children.sort();
        Ok(children)
    }

    /// Returns the ids of nodes nothing ran after, in id order.
    pub fn heads(&self) -> Vec<NodeId> {
        let mut heads: Vec<NodeId> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].id)
            .collect();
        heads.sort();
        heads
    }

    /// Number of nodes in the trace.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of parent-child edges in the trace.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Walks the trace in end-before-start order. See the module docs for
    /// the exact contract.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.graph)
    }
}

/// Lazy, single-pass iterator returned by [`TraceGraph::walk`].
///
/// Each node is yielded exactly once. Nodes on a cycle (which a well-formed
/// trace never has) are never yielded.
#[derive(Debug)]
pub struct Walk<'a> {
    graph: &'a StableGraph<TraceNode, (), Directed, u32>,
    /// Children not yet yielded, per node.
    remaining_children: IndexMap<NodeIndex<u32>, usize>,
    stack: Vec<NodeIndex<u32>>,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a StableGraph<TraceNode, (), Directed, u32>) -> Self {
        let mut remaining_children = IndexMap::with_capacity(graph.node_count());
        let mut heads = Vec::new();
        for idx in graph.node_indices() {
            let children = graph.edges_directed(idx, Direction::Outgoing).count();
            if children == 0 {
                heads.push(idx);
            }
            remaining_children.insert(idx, children);
        }

        // Lowest id on top so independent heads come out in id order.
        heads.sort_by_key(|&idx| std::cmp::Reverse(graph[idx].id));

        Walk {
            graph,
            remaining_children,
            stack: heads,
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TraceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;

        // One decrement per edge, so repeated parent entries stay balanced.
        let mut ready = Vec::new();
        for parent in self.graph.neighbors_directed(idx, Direction::Incoming) {
            if let Some(remaining) = self.remaining_children.get_mut(&parent) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    ready.push(parent);
                }
            }
        }

        // Highest id ends up on top: the most recently started branch of a
        // fork is drained first.
        ready.sort_by_key(|&parent| self.graph[parent].id);
        ready.dedup();
        self.stack.extend(ready);

        self.graph.node_weight(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Marker, NodeKind};

    fn ids<'a>(walk: impl Iterator<Item = &'a TraceNode>) -> Vec<u32> {
        walk.map(|n| n.id.0).collect()
    }

    /// start(1) -> stage start(2) -> stage end(3) -> end(4)
    fn linear_trace() -> TraceGraph {
        TraceGraph::from_nodes(vec![
            TraceNode::scope_start(1, "run", 0),
            TraceNode::scope_start(2, "Build", 10)
                .with_marker(Marker::Label("Build".into()))
                .with_parent(1),
            TraceNode::scope_end(3, 40).with_parent(2),
            TraceNode::scope_end(4, 50).with_parent(3),
        ])
        .unwrap()
    }

    #[test]
    fn linear_walk_is_reverse_execution_order() {
        let trace = linear_trace();
        assert_eq!(ids(trace.walk()), vec![4, 3, 2, 1]);
    }

    #[test]
    fn fork_and_join_drain_one_branch_at_a_time() {
        // 1 parallel start, 2/3 branch starts, 4/5 branch ends, 6 parallel end
        let trace = TraceGraph::from_nodes(vec![
            TraceNode::scope_start(1, "parallel", 0),
            TraceNode::scope_start(2, "Branch: a", 1).with_parent(1),
            TraceNode::scope_start(3, "Branch: b", 1).with_parent(1),
            TraceNode::scope_end(4, 5).with_parent(2),
            TraceNode::scope_end(5, 7).with_parent(3),
            TraceNode::scope_end(6, 8).with_parent(4).with_parent(5),
        ])
        .unwrap();

        assert_eq!(ids(trace.walk()), vec![6, 5, 3, 4, 2, 1]);
    }

    #[test]
    fn every_node_is_visited_once() {
        let trace = linear_trace();
        let visited = ids(trace.walk());
        assert_eq!(visited.len(), trace.node_count());
    }

    #[test]
    fn nodes_may_arrive_out_of_order() {
        let trace = TraceGraph::from_nodes(vec![
            TraceNode::scope_end(2, 10).with_parent(1),
            TraceNode::scope_start(1, "run", 0),
        ])
        .unwrap();
        assert_eq!(trace.edge_count(), 1);
        assert_eq!(trace.heads(), vec![NodeId(2)]);
        assert_eq!(trace.children(NodeId(1)).unwrap(), vec![NodeId(2)]);
    }

    #[test]
    fn add_node_requires_known_parents() {
        let mut trace = TraceGraph::new();
        trace.add_node(TraceNode::scope_start(1, "run", 0)).unwrap();
        let err = trace
            .add_node(TraceNode::scope_end(3, 1).with_parent(2))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnknownParent {
                node: NodeId(3),
                parent: NodeId(2)
            }
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = TraceGraph::from_nodes(vec![
            TraceNode::step(1, "a", 0),
            TraceNode::step(1, "b", 0),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateNode { id: NodeId(1) }));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = TraceGraph::from_nodes(vec![TraceNode::step(1, "a", 0).with_parent(9)])
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownParent { .. }));
    }

    #[test]
    fn get_returns_node_by_producer_id() {
        let trace = linear_trace();
        let node = trace.get(NodeId(2)).unwrap();
        assert_eq!(node.kind, NodeKind::ScopeStart);
        assert_eq!(node.display_name, "Build");
        assert!(trace.get(NodeId(99)).is_none());
        assert!(matches!(
            trace.children(NodeId(99)),
            Err(CoreError::NodeNotFound { id: NodeId(99) })
        ));
    }

    #[test]
    fn empty_trace_walks_nothing() {
        let trace = TraceGraph::new();
        assert_eq!(trace.walk().count(), 0);
    }
}
