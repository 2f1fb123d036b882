//! Plugin administration handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use tracing::info;

use podview_core::error::AppError;
use podview_core::traits::EventSink;
use podview_plugin::PluginSummary;

use crate::dto::request::ToggleRequest;
use crate::dto::response::ToggleResponse;
use crate::error::ApiError;
use crate::middleware::auth::Principal;
use crate::state::AppState;

/// Event type recorded for every administrative toggle.
pub const TOGGLE_EVENT: &str = "plugins.toggle";

/// GET /api/plugins
pub async fn list_plugins(State(state): State<AppState>) -> Json<Vec<PluginSummary>> {
    Json(state.registry.list().await)
}

/// GET /api/plugins/{name}
pub async fn get_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PluginSummary>, ApiError> {
    Ok(Json(state.registry.get(&name).await?))
}

/// POST /api/plugins/{name}/toggle
///
/// The flag is persisted before the plugin is activated or deactivated.
/// Activation failures are reported as errors while the persisted flag
/// keeps the requested value.
pub async fn toggle_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(Principal(actor)): Extension<Principal>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;

    info!(plugin = %name, enabled = req.enabled, actor = %actor, "Plugin toggle requested");
    let result = state.registry.toggle(&name, req.enabled).await;

    let details = match &result {
        Ok(outcome) => format!(
            "{name} enabled={} state={} restart_required={}",
            outcome.enabled, outcome.state, outcome.restart_required
        ),
        Err(e) => format!("{name} enabled={}: {e}", req.enabled),
    };
    state
        .events
        .add(TOGGLE_EVENT, &actor, "", result.is_ok(), &details);

    Ok(Json(result?.into()))
}
