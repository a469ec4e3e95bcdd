//! Configuration handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use wjp_metrics::MetricsConfig;

use crate::error::ApiError;
use crate::state::AppState;

/// Returns the active configuration.
///
/// `GET /config`
pub async fn get_config(State(state): State<AppState>) -> Json<MetricsConfig> {
    let service = state.service.lock().await;
    Json(service.config().clone())
}

/// Replaces the configuration. The current sink is closed; the next
/// emission opens one for the new endpoint.
///
/// `PUT /config`
pub async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<MetricsConfig>,
) -> Result<Json<MetricsConfig>, ApiError> {
    // Reject before touching the running sink.
    config.validate()?;
    let mut service = Arc::clone(&state.service).lock_owned().await;
    let applied = tokio::task::spawn_blocking(move || service.update_config(config)).await??;
    Ok(Json(applied))
}
