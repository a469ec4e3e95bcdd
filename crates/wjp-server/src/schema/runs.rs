//! Run and step emission responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wjp_metrics::{EmissionSummary, RunReport};

/// Response to `POST /runs`.
///
/// `emitted` is `false`, with nothing else set, when no proxy is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub emitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

impl RunResponse {
    pub fn not_emitted() -> Self {
        RunResponse {
            emitted: false,
            report_id: None,
            report: None,
        }
    }
}

/// Response to `POST /steps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    pub emitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<EmissionSummary>,
}

/// Response to `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub proxy_configured: bool,
}
