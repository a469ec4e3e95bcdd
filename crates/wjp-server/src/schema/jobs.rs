//! Per-job property responses.

use serde::{Deserialize, Serialize};
use wjp_metrics::JobProperty;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPropertyResponse {
    /// Job full name, as given in the path.
    pub job: String,
    pub property: JobProperty,
}
