//! Code-coverage data attached to a run.

use serde::{Deserialize, Serialize};

/// Coverage counter category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageCategory {
    Instructions,
    Branch,
    Complexity,
    Line,
    Method,
    Class,
}

impl CoverageCategory {
    pub const ALL: [CoverageCategory; 6] = [
        CoverageCategory::Instructions,
        CoverageCategory::Branch,
        CoverageCategory::Complexity,
        CoverageCategory::Line,
        CoverageCategory::Method,
        CoverageCategory::Class,
    ];

    /// Metric name segment, e.g. `branch-coverage`.
    pub fn metric_stem(&self) -> &'static str {
        match self {
            CoverageCategory::Instructions => "instructions-coverage",
            CoverageCategory::Branch => "branch-coverage",
            CoverageCategory::Complexity => "complexity-coverage",
            CoverageCategory::Line => "line-coverage",
            CoverageCategory::Method => "method-coverage",
            CoverageCategory::Class => "class-coverage",
        }
    }
}

/// Coverage figures for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub category: CoverageCategory,
    /// Covered percentage, 0 to 100.
    pub percentage: f64,
    /// Configured minimum threshold.
    #[serde(default)]
    pub minimum: f64,
    /// Configured maximum threshold.
    #[serde(default)]
    pub maximum: f64,
    #[serde(default)]
    pub covered: u64,
    #[serde(default)]
    pub total: u64,
}

/// Per-category coverage of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageReport {
    pub entries: Vec<CoverageEntry>,
}

impl CoverageReport {
    pub fn get(&self, category: CoverageCategory) -> Option<&CoverageEntry> {
        self.entries.iter().find(|e| e.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_are_distinct() {
        let mut stems: Vec<_> = CoverageCategory::ALL.iter().map(|c| c.metric_stem()).collect();
        stems.sort_unstable();
        stems.dedup();
        assert_eq!(stems.len(), CoverageCategory::ALL.len());
    }

    #[test]
    fn report_deserializes_with_defaults() {
        let json = r#"{"entries":[{"category":"line","percentage":87.5,"covered":7,"total":8}]}"#;
        let report: CoverageReport = serde_json::from_str(json).unwrap();
        let line = report.get(CoverageCategory::Line).unwrap();
        assert_eq!(line.covered, 7);
        assert_eq!(line.minimum, 0.0);
        assert!(report.get(CoverageCategory::Branch).is_none());
    }
}
