//! The LED plugin and its route handlers.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use parking_lot::RwLock;
use serde_json::json;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use podview_core::result::AppResult;
use podview_plugin::{BasePlugin, Plugin, PluginDependencies, Route, read_json, write_json};

use crate::model::{LedInfo, LedSettings, LedState, StatusResponse, ToggleLedsRequest};
use crate::sysfs::{self, DEFAULT_LEDS_PATH};

/// Plugin name.
pub const NAME: &str = "led";

/// Setting naming the LED class directory.
pub const LEDS_PATH_KEY: &str = "LEDS_PATH";

/// Setting holding [`LedSettings::auto_disable_on_startup`].
pub const AUTO_DISABLE_KEY: &str = "autoDisableOnStartup";

#[derive(Debug)]
struct Leds {
    base: BasePlugin,
    root: RwLock<PathBuf>,
    leds: RwLock<Vec<LedInfo>>,
    state: RwLock<LedState>,
    settings: RwLock<LedSettings>,
    /// Serialises sysfs reads and writes.
    io: Mutex<()>,
}

impl Leds {
    async fn load_settings(&self) {
        match self.base.bool_setting(AUTO_DISABLE_KEY).await {
            Some(auto_disable) => {
                self.settings.write().auto_disable_on_startup = auto_disable;
                self.base
                    .log_info(format_args!("Loaded auto-disable setting: {auto_disable}"));
            }
            None => {
                if let Err(e) = self.base.set_bool_setting(AUTO_DISABLE_KEY, false).await {
                    self.base
                        .log_warn(format_args!("Failed to save default settings: {e}"));
                }
            }
        }
    }

    async fn discover(&self) {
        let root = self.root.read().clone();
        let _io = self.io.lock().await;

        let leds = match sysfs::discover(&root).await {
            Ok(leds) => {
                if leds.is_empty() {
                    self.base.log_warn(format_args!(
                        "No controllable LEDs found in {}",
                        root.display()
                    ));
                }
                leds
            }
            Err(e) => {
                self.base
                    .log_warn(format_args!("Failed to discover LEDs: {e}"));
                Vec::new()
            }
        };

        *self.state.write() = LedState::from_leds(&leds);
        *self.leds.write() = leds;
    }

    /// Re-reads every LED and recomputes the aggregate state.
    async fn refresh(&self) -> LedState {
        let _io = self.io.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> LedState {
        let mut leds = self.leds.read().clone();
        sysfs::refresh(&mut leds).await;

        let state = LedState::from_leds(&leds);
        *self.leds.write() = leds;
        *self.state.write() = state.clone();
        state
    }

    async fn switch_all(&self, on: bool) -> AppResult<usize> {
        let _io = self.io.lock().await;
        let leds = self.leds.read().clone();

        let switched = sysfs::set_all(&leds, on).await?;
        self.base.log_info(format_args!(
            "{} {switched}/{} LEDs",
            if on { "Enabled" } else { "Disabled" },
            leds.len()
        ));
        self.refresh_locked().await;
        Ok(switched)
    }

    async fn update_settings(&self, settings: LedSettings) -> AppResult<()> {
        self.base
            .set_bool_setting(AUTO_DISABLE_KEY, settings.auto_disable_on_startup)
            .await?;
        *self.settings.write() = settings;
        self.base.log_info(format_args!(
            "Settings updated: auto-disable={}",
            settings.auto_disable_on_startup
        ));
        Ok(())
    }

    async fn handle_status(&self) -> Response {
        let state = self.refresh().await;
        let response = StatusResponse {
            state,
            settings: *self.settings.read(),
            leds: self.leds.read().clone(),
        };
        write_json(StatusCode::OK, &response)
    }

    async fn handle_toggle(&self, request: Request) -> Response {
        let req: ToggleLedsRequest = match read_json(request).await {
            Ok(req) => req,
            Err(response) => return response,
        };

        let available = self.state.read().total_leds;
        if available == 0 {
            let root = self.root.read().display().to_string();
            return write_json(
                StatusCode::BAD_REQUEST,
                &json!({
                    "error": format!("No LEDs available. This plugin requires a Linux system with accessible LEDs in {root}"),
                }),
            );
        }

        match self.switch_all(req.enable).await {
            Ok(_) => {
                let status = if req.enable { "enabled" } else { "disabled" };
                self.base
                    .add_event(if req.enable { "leds_enabled" } else { "leds_disabled" }, &format!("LEDs {status}"));
                write_json(
                    StatusCode::OK,
                    &json!({
                        "status": format!("LEDs {status} successfully"),
                        "enabled": req.enable,
                    }),
                )
            }
            Err(e) => {
                self.base.log_error(format_args!("Failed to toggle LEDs: {e}"));
                write_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!({ "error": format!("Failed to toggle LEDs: {}", e.message) }),
                )
            }
        }
    }

    async fn handle_update_settings(&self, request: Request) -> Response {
        let settings: LedSettings = match read_json(request).await {
            Ok(settings) => settings,
            Err(response) => return response,
        };

        match self.update_settings(settings).await {
            Ok(()) => write_json(
                StatusCode::OK,
                &json!({ "status": "Settings updated successfully" }),
            ),
            Err(e) => {
                self.base
                    .log_error(format_args!("Failed to update settings: {e}"));
                write_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!({ "error": "Failed to update settings" }),
                )
            }
        }
    }
}

/// Manages system LEDs.
#[derive(Debug)]
pub struct LedPlugin {
    inner: Arc<Leds>,
}

impl LedPlugin {
    /// Creates the plugin with no LEDs discovered yet.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Leds {
                base: BasePlugin::new(NAME, "LED control and management", "1.0.0"),
                root: RwLock::new(PathBuf::from(DEFAULT_LEDS_PATH)),
                leds: RwLock::new(Vec::new()),
                state: RwLock::new(LedState::from_leds(&[])),
                settings: RwLock::new(LedSettings::default()),
                io: Mutex::new(()),
            }),
        }
    }

    /// Last computed aggregate state.
    pub fn state(&self) -> LedState {
        self.inner.state.read().clone()
    }

    /// Current settings.
    pub fn settings(&self) -> LedSettings {
        *self.inner.settings.read()
    }
}

impl Default for LedPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for LedPlugin {
    fn name(&self) -> &str {
        self.inner.base.name()
    }

    fn description(&self) -> &str {
        self.inner.base.description()
    }

    fn version(&self) -> &str {
        self.inner.base.version()
    }

    async fn init(&self, _ctx: &CancellationToken, deps: Arc<PluginDependencies>) -> AppResult<()> {
        let leds = &self.inner;
        leds.base.set_dependencies(deps);

        let root = leds
            .base
            .setting_or_default(LEDS_PATH_KEY, DEFAULT_LEDS_PATH)
            .await;
        *leds.root.write() = PathBuf::from(root);

        leds.load_settings().await;
        leds.discover().await;

        let auto_disable = leds.settings.read().auto_disable_on_startup;
        if auto_disable {
            match leds.switch_all(false).await {
                Ok(count) => leds
                    .base
                    .log_info(format_args!("Auto-disabled {count} LEDs on startup")),
                Err(e) => leds
                    .base
                    .log_warn(format_args!("Failed to auto-disable LEDs: {e}")),
            }
        }

        let state = leds.refresh().await;
        leds.base.log_info(format_args!(
            "Plugin initialized (found {} LEDs)",
            state.total_leds
        ));
        Ok(())
    }

    async fn start(&self, _ctx: &CancellationToken) -> AppResult<()> {
        self.inner.base.log_info("Plugin started");
        Ok(())
    }

    async fn stop(&self, _ctx: &CancellationToken) -> AppResult<()> {
        self.inner.base.log_info("Plugin stopped");
        Ok(())
    }

    fn routes(&self) -> Vec<Route> {
        let status = Arc::clone(&self.inner);
        let toggle = Arc::clone(&self.inner);
        let get_settings = Arc::clone(&self.inner);
        let set_settings = Arc::clone(&self.inner);

        vec![
            Route::get("/api/plugins/led/status", move |_req: Request| {
                let leds = Arc::clone(&status);
                async move { leds.handle_status().await }
            }),
            Route::post("/api/plugins/led/leds", move |req: Request| {
                let leds = Arc::clone(&toggle);
                async move { leds.handle_toggle(req).await }
            }),
            Route::get("/api/plugins/led/settings", move |_req: Request| {
                let leds = Arc::clone(&get_settings);
                async move { write_json(StatusCode::OK, &*leds.settings.read()) }
            }),
            Route::post("/api/plugins/led/settings", move |req: Request| {
                let leds = Arc::clone(&set_settings);
                async move { leds.handle_update_settings(req).await }
            }),
        ]
    }

    async fn is_enabled(&self) -> bool {
        self.inner.base.is_enabled().await
    }
}
