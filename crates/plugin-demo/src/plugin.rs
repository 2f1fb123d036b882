//! The demo plugin.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use podview_plugin::prelude::*;

/// Plugin name.
pub const NAME: &str = "demo";

/// Setting holding the greeting shown by `/info`.
pub const MESSAGE_KEY: &str = "MESSAGE";

const DEFAULT_MESSAGE: &str = "Hello from Demo Plugin!";

/// Settings that `/info` may echo back. Anything else in the namespace,
/// such as credentials, stays private.
const PUBLIC_SETTINGS: &[&str] = &[MESSAGE_KEY];

/// `/info` response.
#[derive(Debug, Clone, Serialize)]
pub struct DemoInfo {
    /// Plugin name.
    pub name: String,
    /// Plugin version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// When `start` last ran; `None` before the first start.
    pub start_time: Option<DateTime<Utc>>,
    /// Seconds since `start_time`, or 0.
    pub uptime_seconds: i64,
    /// Value of the in-memory counter.
    pub counter: u64,
    /// Whitelisted settings only.
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Runtime {
    started_at: Option<DateTime<Utc>>,
    counter: u64,
}

/// State shared between the plugin and its route handlers.
#[derive(Debug)]
struct Demo {
    base: BasePlugin,
    settings: RwLock<BTreeMap<String, String>>,
    runtime: Mutex<Runtime>,
}

impl Demo {
    fn info(&self) -> DemoInfo {
        let runtime = self.runtime.lock();
        let uptime_seconds = runtime
            .started_at
            .map(|started| (Utc::now() - started).num_seconds())
            .unwrap_or(0);

        DemoInfo {
            name: self.base.name().to_string(),
            version: self.base.version().to_string(),
            description: self.base.description().to_string(),
            start_time: runtime.started_at,
            uptime_seconds,
            counter: runtime.counter,
            settings: self.settings.read().clone(),
        }
    }

    fn increment(&self) -> u64 {
        let value = {
            let mut runtime = self.runtime.lock();
            runtime.counter += 1;
            runtime.counter
        };
        self.base.add_event("counter_incremented", "Counter incremented");
        self.base.log_info(format_args!("Counter incremented to {value}"));
        value
    }
}

/// Simple demonstration plugin.
#[derive(Debug)]
pub struct DemoPlugin {
    inner: Arc<Demo>,
}

impl DemoPlugin {
    /// Creates the plugin in its unconfigured state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Demo {
                base: BasePlugin::new(NAME, "Simple demonstration plugin", "1.0.0"),
                settings: RwLock::new(BTreeMap::from([(
                    MESSAGE_KEY.to_string(),
                    DEFAULT_MESSAGE.to_string(),
                )])),
                runtime: Mutex::new(Runtime::default()),
            }),
        }
    }

    /// Current counter value.
    pub fn counter(&self) -> u64 {
        self.inner.runtime.lock().counter
    }
}

impl Default for DemoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for DemoPlugin {
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
        let base = &self.inner.base;
        base.set_dependencies(deps);
        base.log_info("Initializing demo plugin");

        let message = base.setting_or_default(MESSAGE_KEY, DEFAULT_MESSAGE).await;
        base.log_info(format_args!("Config message: {message}"));

        let mut exposed: BTreeMap<String, String> = base
            .settings()
            .await
            .into_iter()
            .filter(|(key, _)| PUBLIC_SETTINGS.iter().any(|p| p.eq_ignore_ascii_case(key)))
            .collect();
        exposed.insert(MESSAGE_KEY.to_string(), message);
        *self.inner.settings.write() = exposed;
        Ok(())
    }

    async fn start(&self, _ctx: &CancellationToken) -> AppResult<()> {
        let now = Utc::now();
        self.inner.runtime.lock().started_at = Some(now);
        self.inner
            .base
            .log_info(format_args!("Starting demo plugin at {}", now.to_rfc3339()));
        self.inner
            .base
            .add_event("started", "Demo plugin started successfully");
        Ok(())
    }

    async fn stop(&self, _ctx: &CancellationToken) -> AppResult<()> {
        self.inner.base.log_info("Stopping demo plugin");
        self.inner.base.add_event("stopped", "Demo plugin stopped");
        Ok(())
    }

    fn routes(&self) -> Vec<Route> {
        let info = Arc::clone(&self.inner);
        let counter = Arc::clone(&self.inner);

        vec![
            Route::get("/api/plugins/demo/info", move |_req: Request| {
                let demo = Arc::clone(&info);
                async move { write_json(StatusCode::OK, &demo.info()) }
            }),
            Route::get("/api/plugins/demo/ping", |_req: Request| async { ping() }),
            Route::post("/api/plugins/demo/counter", move |_req: Request| {
                let demo = Arc::clone(&counter);
                async move {
                    let value = demo.increment();
                    write_json(StatusCode::OK, &serde_json::json!({ "counter": value }))
                }
            }),
        ]
    }

    async fn is_enabled(&self) -> bool {
        self.inner.base.is_enabled().await
    }
}

fn ping() -> Response {
    write_json(
        StatusCode::OK,
        &serde_json::json!({
            "status": "ok",
            "timestamp": Utc::now().timestamp(),
            "message": "pong",
        }),
    )
}
