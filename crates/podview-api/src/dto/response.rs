//! Response DTOs.

use serde::{Deserialize, Serialize};

use podview_plugin::{PluginState, ToggleOutcome};

/// Response of a plugin toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
    /// Plugin name.
    pub plugin: String,
    /// Persisted flag.
    pub enabled: bool,
    /// Whether the change needs a restart to take effect.
    pub restart_required: bool,
    /// State after the toggle.
    pub state: PluginState,
}

impl From<ToggleOutcome> for ToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            success: true,
            plugin: outcome.plugin,
            enabled: outcome.enabled,
            restart_required: outcome.restart_required,
            state: outcome.state,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Number of running plugins.
    pub plugins_running: usize,
    /// Number of published plugin routes.
    pub plugin_routes: usize,
    /// Whether plugin toggles apply without a restart.
    pub live_mount: bool,
}
