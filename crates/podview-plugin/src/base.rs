//! Reusable default behaviour for plugins.
//!
//! `BasePlugin` is composed by value inside a concrete plugin. It is not
//! required by the [`Plugin`](crate::traits::Plugin) trait; a plugin may
//! implement everything itself.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use podview_core::error::AppError;
use podview_core::result::AppResult;

use crate::deps::PluginDependencies;
use crate::events::{PLUGIN_ACTOR, is_valid_event_type, qualified_event_type};
use crate::traits::PluginDescriptor;

/// Identity, logging, settings and event helpers shared by plugins.
pub struct BasePlugin {
    /// Plugin identity.
    descriptor: PluginDescriptor,
    /// Attached by `set_dependencies` during `init`.
    deps: ArcSwapOption<PluginDependencies>,
}

impl BasePlugin {
    /// Creates a new base with no dependencies attached.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            descriptor: PluginDescriptor::new(name, description, version),
            deps: ArcSwapOption::empty(),
        }
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Plugin description.
    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    /// Plugin version.
    pub fn version(&self) -> &str {
        &self.descriptor.version
    }

    /// Plugin descriptor.
    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Attaches the dependency bundle. Called from `init`.
    pub fn set_dependencies(&self, deps: Arc<PluginDependencies>) {
        self.deps.store(Some(deps));
    }

    /// The attached bundle, if `init` has run.
    pub fn deps(&self) -> Option<Arc<PluginDependencies>> {
        self.deps.load_full()
    }

    fn span(&self) -> tracing::Span {
        self.deps
            .load()
            .as_ref()
            .map(|deps| deps.logger.clone())
            .unwrap_or_else(tracing::Span::none)
    }

    /// Logs an informational message tagged with the plugin name.
    pub fn log_info(&self, message: impl fmt::Display) {
        info!(parent: &self.span(), plugin = %self.name(), "{message}");
    }

    /// Logs a warning tagged with the plugin name.
    pub fn log_warn(&self, message: impl fmt::Display) {
        warn!(parent: &self.span(), plugin = %self.name(), "{message}");
    }

    /// Logs an error tagged with the plugin name.
    pub fn log_error(&self, message: impl fmt::Display) {
        error!(parent: &self.span(), plugin = %self.name(), "{message}");
    }

    /// Records `plugin.<name>.<event_type>` in the event log.
    ///
    /// `event_type` may only contain ASCII letters, digits, `_` and `.`.
    /// Anything else is dropped with a warning. Returns whether the event
    /// was forwarded.
    pub fn add_event(&self, event_type: &str, message: &str) -> bool {
        if !is_valid_event_type(event_type) {
            warn!(
                parent: &self.span(),
                plugin = %self.name(),
                event_type = ?event_type,
                "Invalid event type rejected"
            );
            return false;
        }

        let Some(deps) = self.deps() else {
            return false;
        };

        deps.events.add(
            &qualified_event_type(self.name(), event_type),
            PLUGIN_ACTOR,
            "",
            true,
            message,
        );
        true
    }

    /// Looks up a setting in this plugin's namespace: the persisted store
    /// first, then static configuration.
    pub async fn setting(&self, key: &str) -> Option<String> {
        let deps = self.deps()?;

        match deps.store.get_setting(self.name(), key).await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => {}
            Err(e) => {
                self.log_warn(format_args!("Failed to read setting '{key}': {e}"));
            }
        }

        deps.config.plugin_setting(self.name(), key)
    }

    /// Looks up a setting, falling back to `default`.
    pub async fn setting_or_default(&self, key: &str, default: &str) -> String {
        self.setting(key)
            .await
            .unwrap_or_else(|| default.to_string())
    }

    /// Every setting in this plugin's namespace, persisted values overriding
    /// static configuration. Empty before `init`.
    pub async fn settings(&self) -> BTreeMap<String, String> {
        let Some(deps) = self.deps() else {
            return BTreeMap::new();
        };

        let mut merged: BTreeMap<String, String> = deps
            .config
            .plugin_settings(self.name())
            .into_iter()
            .collect();
        match deps.store.settings(self.name()).await {
            Ok(stored) => merged.extend(stored),
            Err(e) => self.log_warn(format_args!("Failed to read settings: {e}")),
        }
        merged
    }

    /// Parses a boolean setting (`true`/`false`/`1`/`0`, case-insensitive).
    ///
    /// Unparseable values are treated as absent.
    pub async fn bool_setting(&self, key: &str) -> Option<bool> {
        let raw = self.setting(key).await?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            other => {
                self.log_warn(format_args!(
                    "Ignoring non-boolean value '{other}' for setting '{key}'"
                ));
                None
            }
        }
    }

    /// Persists a setting in this plugin's namespace.
    pub async fn set_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let deps = self.deps().ok_or_else(|| {
            AppError::plugin(format!("Plugin '{}' is not initialized", self.name()))
        })?;
        deps.store.set_setting(self.name(), key, value).await
    }

    /// Persists a boolean setting.
    pub async fn set_bool_setting(&self, key: &str, value: bool) -> AppResult<()> {
        self.set_setting(key, if value { "true" } else { "false" })
            .await
    }

    /// Reads the persisted enabled flag, falling back to the configured
    /// default list. `false` until `init` has attached dependencies.
    pub async fn is_enabled(&self) -> bool {
        let Some(deps) = self.deps() else {
            return false;
        };

        match deps.store.get_enabled(self.name()).await {
            Ok(Some(enabled)) => enabled,
            Ok(None) => deps.config.enabled_by_default(self.name()),
            Err(e) => {
                self.log_warn(format_args!("Failed to read enabled flag: {e}"));
                deps.config.enabled_by_default(self.name())
            }
        }
    }

    /// Writes a JSON response.
    pub fn write_json<T: Serialize>(&self, status: StatusCode, data: &T) -> Response {
        write_json(status, data)
    }
}

impl fmt::Debug for BasePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasePlugin")
            .field("descriptor", &self.descriptor)
            .field("initialized", &self.deps.load().is_some())
            .finish()
    }
}

/// Serialises `data` as a JSON response with the given status.
///
/// If serialisation fails the client gets a 500 with an error body.
pub fn write_json<T: Serialize>(status: StatusCode, data: &T) -> Response {
    match serde_json::to_vec(data) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode JSON response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"failed to encode response"}"#,
            )
                .into_response()
        }
    }
}

/// Largest request body accepted by [`read_json`].
pub const MAX_JSON_BODY: usize = 64 * 1024;

/// Reads the request body as JSON.
///
/// The `Content-Type` header is not checked. On failure the returned
/// response is a 400 with `{"error": "Invalid request body"}`.
pub async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, Response> {
    let invalid = || {
        write_json(
            StatusCode::BAD_REQUEST,
            &serde_json::json!({ "error": "Invalid request body" }),
        )
    };

    let bytes = to_bytes(request.into_body(), MAX_JSON_BODY)
        .await
        .map_err(|_| invalid())?;
    serde_json::from_slice(&bytes).map_err(|_| invalid())
}
