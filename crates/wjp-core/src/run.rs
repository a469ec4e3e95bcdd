//! Run-level inputs supplied by the build host when a run completes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coverage::CoverageReport;
use crate::node::TraceNode;
use crate::test_report::TestReport;

/// Final result of a whole run, as reported by the build host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl RunResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunResult::Success => "SUCCESS",
            RunResult::Unstable => "UNSTABLE",
            RunResult::Failure => "FAILURE",
            RunResult::NotBuilt => "NOT_BUILT",
            RunResult::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build parameter. Values are stringified by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl Parameter {
    pub fn new(name: &str, value: &str) -> Self {
        Parameter {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// The value, when present and non-empty.
    pub fn non_empty_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Scalars describing one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Full job name, possibly percent-encoded and folder-qualified.
    pub job_full_name: String,
    /// Run identifier (build number).
    pub build_id: String,
    /// Total run duration in milliseconds.
    pub duration_ms: i64,
    pub result: RunResult,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl RunSummary {
    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Everything the host hands over when a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    #[serde(flatten)]
    pub run: RunSummary,
    /// Trace nodes, present for pipeline runs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageReport>,
}

impl RunEvent {
    /// An event carrying only run scalars.
    pub fn new(run: RunSummary) -> Self {
        RunEvent {
            run,
            trace: None,
            tests: None,
            coverage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_event_flattens_summary() {
        let json = r#"{
            "job_full_name": "Test Job",
            "build_id": "33",
            "duration_ms": 15000,
            "result": "ABORTED",
            "parameters": [{"name": "branch", "value": "master"}, {"name": "empty"}]
        }"#;
        let event: RunEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.run.build_id, "33");
        assert_eq!(event.run.result, RunResult::Aborted);
        assert!(event.trace.is_none());
        assert_eq!(
            event.run.parameter("branch").and_then(Parameter::non_empty_value),
            Some("master")
        );
        assert_eq!(event.run.parameter("empty").and_then(Parameter::non_empty_value), None);
    }

    #[test]
    fn result_strings_match_host_values() {
        assert_eq!(RunResult::NotBuilt.to_string(), "NOT_BUILT");
        assert_eq!(
            serde_json::from_str::<RunResult>("\"UNSTABLE\"").unwrap(),
            RunResult::Unstable
        );
    }
}
