//! Per-job property handlers.

use axum::extract::{Path, State};
use axum::Json;
use tracing::debug;
use wjp_metrics::JobProperty;

use crate::error::ApiError;
use crate::schema::jobs::JobPropertyResponse;
use crate::state::AppState;

/// `GET /jobs/{name}/property`
pub async fn get_property(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<JobPropertyResponse>, ApiError> {
    let property = state
        .job_property(&name)
        .ok_or_else(|| ApiError::NotFound(format!("no property for job '{name}'")))?;
    Ok(Json(JobPropertyResponse {
        job: name,
        property,
    }))
}

/// Creates or replaces a job's property.
///
/// `PUT /jobs/{name}/property`
pub async fn put_property(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(property): Json<JobProperty>,
) -> Json<JobPropertyResponse> {
    debug!(job = %name, "job property updated");
    state.job_properties.insert(name.clone(), property.clone());
    Json(JobPropertyResponse {
        job: name,
        property,
    })
}

/// `DELETE /jobs/{name}/property`
pub async fn delete_property(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .job_properties
        .remove(&name)
        .ok_or_else(|| ApiError::NotFound(format!("no property for job '{name}'")))?;
    Ok(Json(serde_json::json!({ "success": true })))
}
