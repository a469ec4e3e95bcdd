use axum::extract::State;
use axum::Json;

use crate::schema::runs::HealthResponse;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = state.service.lock().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        proxy_configured: service.config().is_configured(),
    })
}
