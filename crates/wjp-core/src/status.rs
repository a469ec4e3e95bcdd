//! Terminal status of a scope, derived from its end node.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::ErrorInfo;

/// Three-valued terminal status of a matched scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeStatus {
    Success,
    Failure,
    Aborted,
}

impl ScopeStatus {
    /// Derives the status from a scope end's error information.
    ///
    /// No error means success. An error without a human-readable cause is
    /// read as cancellation; with a cause it is a failure.
    pub fn from_error(error: Option<&ErrorInfo>) -> Self {
        match error {
            None => ScopeStatus::Success,
            Some(ErrorInfo { cause: None }) => ScopeStatus::Aborted,
            Some(ErrorInfo { cause: Some(_) }) => ScopeStatus::Failure,
        }
    }

    /// Tag value as sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeStatus::Success => "SUCCESS",
            ScopeStatus::Failure => "FAILURE",
            ScopeStatus::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for ScopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
