//! Test-result data attached to a run.

use serde::{Deserialize, Serialize};

/// Aggregated test results of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestReport {
    pub total: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Aggregate duration in seconds.
    pub duration_secs: f64,
    pub failed_tests: Vec<TestCase>,
    pub skipped_tests: Vec<TestCase>,
    pub passed_tests: Vec<TestCase>,
}

impl TestReport {
    /// `total - failed - skipped`, never negative.
    pub fn passed(&self) -> u64 {
        self.total
            .saturating_sub(self.failed)
            .saturating_sub(self.skipped)
    }

    /// Individual outcomes in emission order: failed, skipped, passed.
    pub fn outcomes(&self) -> impl Iterator<Item = (TestOutcome, &TestCase)> {
        let failed = self.failed_tests.iter().map(|t| (TestOutcome::Failed, t));
        let skipped = self.skipped_tests.iter().map(|t| (TestOutcome::Skipped, t));
        let passed = self.passed_tests.iter().map(|t| (TestOutcome::Passed, t));
        failed.chain(skipped).chain(passed)
    }
}

/// One executed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Fully qualified test name, e.g. `pkg.Class.method[case]`.
    pub full_name: String,
    #[serde(default)]
    pub duration_secs: f64,
}

impl TestCase {
    pub fn new(full_name: &str, duration_secs: f64) -> Self {
        TestCase {
            full_name: full_name.to_string(),
            duration_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestOutcome {
    Failed,
    Skipped,
    Passed,
}

impl TestOutcome {
    /// Value of the `Test Status` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Failed => "Failed",
            TestOutcome::Skipped => "Skipped",
            TestOutcome::Passed => "Passed",
        }
    }
}
