//! Router assembly for the HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. Job names containing `/`
/// must be percent-encoded in the path.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/runs", post(handlers::runs::report_run))
        .route("/steps", post(handlers::runs::report_step))
        .route(
            "/config",
            get(handlers::config::get_config).put(handlers::config::put_config),
        )
        .route(
            "/jobs/{name}/property",
            get(handlers::jobs::get_property)
                .put(handlers::jobs::put_property)
                .delete(handlers::jobs::delete_property),
        )
        .route("/health", get(handlers::health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
