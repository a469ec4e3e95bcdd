//! Run-completion and timed-step handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use uuid::Uuid;
use wjp_core::RunEvent;
use wjp_metrics::StepEvent;

use crate::error::ApiError;
use crate::schema::runs::{RunResponse, StepResponse};
use crate::state::AppState;

/// Emits metrics for a completed run.
///
/// `POST /runs`
pub async fn report_run(
    State(state): State<AppState>,
    Json(event): Json<RunEvent>,
) -> Result<Json<RunResponse>, ApiError> {
    let property = state.job_property(&event.run.job_full_name);
    let mut service = Arc::clone(&state.service).lock_owned().await;
    let report =
        tokio::task::spawn_blocking(move || service.report_run(&event, property.as_ref()))
            .await??;

    Ok(Json(match report {
        Some(report) => RunResponse {
            emitted: true,
            report_id: Some(Uuid::new_v4()),
            report: Some(report),
        },
        None => RunResponse::not_emitted(),
    }))
}

/// Emits the duration of a timed block.
///
/// `POST /steps`
pub async fn report_step(
    State(state): State<AppState>,
    Json(event): Json<StepEvent>,
) -> Result<Json<StepResponse>, ApiError> {
    if event.end_ms < event.start_ms {
        return Err(ApiError::BadRequest(format!(
            "step ends before it starts ({} < {})",
            event.end_ms, event.start_ms
        )));
    }
    let mut service = Arc::clone(&state.service).lock_owned().await;
    let summary = tokio::task::spawn_blocking(move || service.report_step(&event)).await??;
    Ok(Json(StepResponse {
        emitted: summary.is_some(),
        summary,
    }))
}
