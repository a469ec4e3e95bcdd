//! Bracket matching over an end-before-start node sequence.
//!
//! [`ScopeMatcher`] consumes nodes in the order produced by
//! [`TraceGraph::walk`](wjp_core::TraceGraph::walk): every scope end arrives
//! before the scope start that encloses it. Ends are pushed on a stack
//! together with their status; a start pops the innermost pending end and
//! the pair becomes a [`MatchedScope`].
//!
//! A start with nothing to pop means the order contract was broken. The
//! matcher yields [`TraceError::UnmatchedScopeStart`] once and then stops.
//! Ends still on the stack when the input runs out (the implicit root scope)
//! are discarded.

use tracing::trace;
use wjp_core::{NodeKind, ScopeStatus, TraceNode};

use crate::error::TraceError;

/// A scope start paired with the scope end that closes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedScope<'a> {
    pub start: &'a TraceNode,
    pub end: &'a TraceNode,
    /// `end.start_time_ms - start.start_time_ms`, saturating at the `i64`
    /// bounds.
    pub duration_ms: i64,
    pub status: ScopeStatus,
}

/// Iterator adapter pairing scope starts with scope ends.
#[derive(Debug)]
pub struct ScopeMatcher<'a, I> {
    nodes: I,
    pending_ends: Vec<(&'a TraceNode, ScopeStatus)>,
    failed: bool,
}

impl<'a, I> ScopeMatcher<'a, I>
where
    I: Iterator<Item = &'a TraceNode>,
{
    pub fn new(nodes: impl IntoIterator<IntoIter = I>) -> Self {
        ScopeMatcher {
            nodes: nodes.into_iter(),
            pending_ends: Vec::new(),
            failed: false,
        }
    }

    /// Number of scope ends still waiting for their start.
    pub fn pending(&self) -> usize {
        self.pending_ends.len()
    }
}

impl<'a, I> Iterator for ScopeMatcher<'a, I>
where
    I: Iterator<Item = &'a TraceNode>,
{
    type Item = Result<MatchedScope<'a>, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        for node in self.nodes.by_ref() {
            match node.kind {
                NodeKind::ScopeEnd => {
                    let status = ScopeStatus::from_error(node.error.as_ref());
                    self.pending_ends.push((node, status));
                }
                NodeKind::ScopeStart => {
                    let Some((end, status)) = self.pending_ends.pop() else {
                        self.failed = true;
                        return Some(Err(TraceError::UnmatchedScopeStart { node: node.id }));
                    };
                    trace!(start = %node.id, end = %end.id, "matched scope");
                    return Some(Ok(MatchedScope {
                        start: node,
                        end,
                        duration_ms: end.start_time_ms.saturating_sub(node.start_time_ms),
                        status,
                    }));
                }
                NodeKind::Other => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wjp_core::{ErrorInfo, NodeId, TraceGraph};

    fn pairs(nodes: &[TraceNode]) -> Vec<(u32, u32, i64)> {
        ScopeMatcher::new(nodes.iter())
            .map(|m| m.unwrap())
            .map(|m| (m.start.id.0, m.end.id.0, m.duration_ms))
            .collect()
    }

    #[test]
    fn flat_sequence_pairs_in_lifo_order() {
        // end(4) end(3) start(2) start(1): 2 closes with 3, 1 closes with 4.
        let nodes = vec![
            TraceNode::scope_end(4, 900),
            TraceNode::scope_end(3, 700),
            TraceNode::step(5, "sh", 400),
            TraceNode::scope_start(2, "inner", 200),
            TraceNode::scope_start(1, "outer", 100),
        ];
        assert_eq!(pairs(&nodes), vec![(2, 3, 500), (1, 4, 800)]);
    }

    #[test]
    fn status_comes_from_the_end_node() {
        let nodes = vec![
            TraceNode::scope_end(2, 50).with_error(ErrorInfo::failure("boom")),
            TraceNode::scope_start(1, "s", 0),
            TraceNode::scope_end(4, 80).with_error(ErrorInfo::cancelled()),
            TraceNode::scope_start(3, "t", 60),
        ];
        let statuses: Vec<_> = ScopeMatcher::new(nodes.iter())
            .map(|m| m.unwrap().status)
            .collect();
        assert_eq!(statuses, vec![ScopeStatus::Failure, ScopeStatus::Aborted]);
    }

    #[test]
    fn start_without_pending_end_fails_once() {
        let nodes = vec![
            TraceNode::scope_end(3, 10),
            TraceNode::scope_start(2, "ok", 0),
            TraceNode::scope_start(1, "orphan", 0),
            TraceNode::scope_end(5, 10),
            TraceNode::scope_start(4, "never reached", 0),
        ];
        let mut matcher = ScopeMatcher::new(nodes.iter());
        assert!(matcher.next().unwrap().is_ok());
        assert!(matches!(
            matcher.next(),
            Some(Err(TraceError::UnmatchedScopeStart { node: NodeId(1) }))
        ));
        assert!(matcher.next().is_none());
    }

    #[test]
    fn leftover_ends_are_tolerated() {
        let nodes = vec![TraceNode::scope_end(9, 10), TraceNode::step(1, "sh", 0)];
        let mut matcher = ScopeMatcher::new(nodes.iter());
        assert!(matcher.next().is_none());
        assert_eq!(matcher.pending(), 1);
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let nodes = vec![
            TraceNode::scope_end(4, i64::MAX),
            TraceNode::scope_end(3, 10),
            TraceNode::scope_start(2, "early", i64::MIN),
            TraceNode::scope_start(1, "late", i64::MIN),
        ];
        assert_eq!(pairs(&nodes), vec![(2, 3, i64::MAX), (1, 4, i64::MAX)]);

        let backwards = vec![
            TraceNode::scope_end(2, i64::MIN),
            TraceNode::scope_start(1, "b", i64::MAX),
        ];
        assert_eq!(pairs(&backwards), vec![(1, 2, i64::MIN)]);
    }

    /// Builds a run with nested stages and a parallel step whose branches
    /// each contain a nested stage:
    ///
    /// ```text
    /// 1 start(run) -> 2 start(stage A) -> 3 start(parallel)
    ///   3 -> 4 start(branch x) -> 5 start(stage x1) -> 6 end(x1) -> 7 end(x)
    ///   3 -> 8 start(branch y) -> 9 end(y)
    ///   7, 9 -> 10 end(parallel) -> 11 end(A) -> 12 end(run)
    /// ```
    fn nested_parallel_trace() -> TraceGraph {
        TraceGraph::from_nodes(vec![
            TraceNode::scope_start(1, "run", 0),
            TraceNode::scope_start(2, "A", 10).with_parent(1),
            TraceNode::scope_start(3, "parallel", 20).with_parent(2),
            TraceNode::scope_start(4, "Branch: x", 30).with_parent(3),
            TraceNode::scope_start(5, "x1", 40).with_parent(4),
            TraceNode::scope_end(6, 140).with_parent(5),
            TraceNode::scope_end(7, 150).with_parent(6),
            TraceNode::scope_start(8, "Branch: y", 30).with_parent(3),
            TraceNode::scope_end(9, 90).with_parent(8),
            TraceNode::scope_end(10, 160).with_parent(7).with_parent(9),
            TraceNode::scope_end(11, 170).with_parent(10),
            TraceNode::scope_end(12, 180).with_parent(11),
        ])
        .unwrap()
    }

    #[test]
    fn walk_of_nested_parallel_trace_pairs_every_scope() {
        let trace = nested_parallel_trace();
        let mut matched: Vec<(u32, u32)> = ScopeMatcher::new(trace.walk())
            .map(|m| m.unwrap())
            .map(|m| (m.start.id.0, m.end.id.0))
            .collect();
        matched.sort();
        assert_eq!(
            matched,
            vec![(1, 12), (2, 11), (3, 10), (4, 7), (5, 6), (8, 9)]
        );
    }

    #[test]
    fn walk_durations_are_non_negative_for_monotonic_timestamps() {
        let trace = nested_parallel_trace();
        for scope in ScopeMatcher::new(trace.walk()) {
            let scope = scope.unwrap();
            assert!(scope.duration_ms >= 0, "{scope:?}");
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// A random forest of well-nested scopes, as a recursive shape.
        #[derive(Debug, Clone)]
        enum Shape {
            Scope(Vec<Shape>),
            Step,
        }

        fn shape() -> impl Strategy<Value = Shape> {
            let leaf = Just(Shape::Step);
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop::collection::vec(inner, 0..4).prop_map(Shape::Scope)
            })
        }

        /// Emits nodes in end-before-start order; returns expected pairs.
        fn lay_out(shape: &Shape, next_id: &mut u32, clock: &mut i64, out: &mut Vec<TraceNode>, expected: &mut Vec<(u32, u32)>) {
            match shape {
                Shape::Step => {
                    *next_id += 1;
                    *clock += 1;
                    out.push(TraceNode::step(*next_id, "step", *clock));
                }
                Shape::Scope(children) => {
                    *next_id += 1;
                    let start_id = *next_id;
                    *clock += 1;
                    let start_time = *clock;
                    let mut body = Vec::new();
                    for child in children {
                        lay_out(child, next_id, clock, &mut body, expected);
                    }
                    *next_id += 1;
                    let end_id = *next_id;
                    *clock += 1;
                    out.push(TraceNode::scope_end(end_id, *clock));
                    out.extend(body);
                    out.push(TraceNode::scope_start(start_id, "scope", start_time));
                    expected.push((start_id, end_id));
                }
            }
        }

        proptest! {
            #[test]
            fn well_nested_sequences_match_completely(shapes in prop::collection::vec(shape(), 1..4)) {
                let mut next_id = 0;
                let mut clock = 0;
                let mut nodes = Vec::new();
                let mut expected = Vec::new();
                for shape in &shapes {
                    let mut part = Vec::new();
                    lay_out(shape, &mut next_id, &mut clock, &mut part, &mut expected);
                    nodes.extend(part);
                }

                let mut got = Vec::new();
                for scope in ScopeMatcher::new(nodes.iter()) {
                    let scope = scope.unwrap();
                    prop_assert!(scope.duration_ms >= 0);
                    got.push((scope.start.id.0, scope.end.id.0));
                }
                got.sort();
                expected.sort();
                prop_assert_eq!(got, expected);
            }
        }
    }
}
