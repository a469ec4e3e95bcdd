//! Decides which matched scopes are reported, and under which name.

use wjp_core::sanitize::sanitize_category;
use wjp_core::TraceNode;

const BRANCH_PREFIX: &str = "Branch: ";

/// Kind of a reportable scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Stage,
    Parallel,
}

impl ScopeKind {
    /// Metric category segment.
    pub fn category(&self) -> &'static str {
        match self {
            ScopeKind::Stage => "stage",
            ScopeKind::Parallel => "parallel",
        }
    }
}

/// A reportable scope and its sanitized name segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedScope {
    pub kind: ScopeKind,
    pub name: String,
}

/// Classifies a scope by its start node.
///
/// A stage has a label and no thread name. A parallel branch carries the
/// parallel-branch marker; its `Branch: ` display prefix is dropped. The
/// stage check wins. Anything else is not reported.
pub fn classify_scope(start: &TraceNode) -> Option<ClassifiedScope> {
    if start.has_label() && !start.has_thread_name() {
        return Some(ClassifiedScope {
            kind: ScopeKind::Stage,
            name: sanitize_category(&start.display_name),
        });
    }
    if start.is_parallel_branch() {
        let name = start
            .display_name
            .strip_prefix(BRANCH_PREFIX)
            .unwrap_or(&start.display_name);
        return Some(ClassifiedScope {
            kind: ScopeKind::Parallel,
            name: sanitize_category(name),
        });
    }
    None
}
