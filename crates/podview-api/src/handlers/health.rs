//! Health check handler.

use axum::Json;
use axum::extract::State;

use podview_plugin::PluginState;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let plugins_running = state
        .registry
        .list()
        .await
        .iter()
        .filter(|summary| summary.state == PluginState::Running)
        .count();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        plugins_running,
        plugin_routes: state.routes.len(),
        live_mount: state.registry.supports_live_mount(),
    })
}
