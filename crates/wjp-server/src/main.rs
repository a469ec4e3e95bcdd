//! Binary entrypoint for the metrics HTTP server.
//!
//! Reads configuration from environment variables:
//! - `WJP_PORT`: server listen port (default: "8080")
//! - `WJP_CONFIG`: JSON config file (default: built-in defaults)
//! - `WJP_PROXY_HOST`, `WJP_PROXY_PORT`: override the proxy endpoint

use std::path::Path;

use wjp_metrics::MetricsConfig;
use wjp_server::router::build_router;
use wjp_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut config = match std::env::var("WJP_CONFIG") {
        Ok(path) => MetricsConfig::load(Path::new(&path))?,
        Err(_) => MetricsConfig::default(),
    };
    if let Ok(host) = std::env::var("WJP_PROXY_HOST") {
        config.proxy_hostname = host;
    }
    if let Ok(port) = std::env::var("WJP_PROXY_PORT") {
        config.proxy_port = port.parse()?;
    }
    let port = std::env::var("WJP_PORT").unwrap_or_else(|_| "8080".to_string());

    if !config.is_configured() {
        tracing::warn!("no proxy host configured; run events will not be emitted");
    }
    let state = AppState::new(config)?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("metrics server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
