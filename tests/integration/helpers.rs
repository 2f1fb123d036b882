//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::Request as AxumRequest;
use http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use podview_api::{
    AppState, BearerTokenAuthenticator, RESERVED_PATHS, build_router, reserved_patterns,
};
use podview_core::config::AppConfig;
use podview_core::result::AppResult;
use podview_core::traits::{PluginStore, UnavailableRuntime};
use podview_plugin::{Plugin, PluginDependencies, PluginRegistry, Route, RouteTable};
use podview_storage::{MemoryEventStore, MemoryPluginStore};

/// Admin token used by apps built with [`TestOptions::secured`].
pub const TOKEN: &str = "test-admin-token";

/// How a [`TestApp`] is assembled.
pub struct TestOptions {
    /// Admin token; `None` disables authentication.
    pub token: Option<String>,
    /// Whether toggles mount and unmount routes while serving.
    pub live_mount: bool,
    /// Plugins enabled by configuration default.
    pub enabled: Vec<String>,
    /// Plugins registered after the compiled-in ones.
    pub extra: Vec<Arc<dyn Plugin>>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            token: None,
            live_mount: true,
            enabled: Vec::new(),
            extra: Vec::new(),
        }
    }
}

impl TestOptions {
    /// Options with the admin token set.
    pub fn secured() -> Self {
        Self {
            token: Some(TOKEN.to_string()),
            ..Self::default()
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Registry behind the router
    pub registry: Arc<PluginRegistry>,
    /// Live plugin route table
    pub routes: Arc<RouteTable>,
    /// Persisted plugin state
    pub store: Arc<MemoryPluginStore>,
    /// Event log
    pub events: Arc<MemoryEventStore>,
    /// Fake LED class directory, kept alive for the app's lifetime
    pub leds_dir: TempDir,
}

impl TestApp {
    /// Create a test application with default options
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    /// Create a test application, register every plugin and boot
    pub async fn with_options(options: TestOptions) -> Self {
        let leds_dir = TempDir::new().unwrap();
        make_led(&leds_dir, "led0", "1");
        make_led(&leds_dir, "led1", "1");

        let mut config = AppConfig::default();
        config.server.admin_token = options.token;
        config.plugins.live_mount = options.live_mount;
        config.plugins.enabled = options.enabled;
        config.plugins.settings.insert(
            "led".to_string(),
            HashMap::from([(
                "LEDS_PATH".to_string(),
                leds_dir.path().display().to_string(),
            )]),
        );

        let store = Arc::new(MemoryPluginStore::new());
        let events = Arc::new(MemoryEventStore::new(config.storage.max_events));
        let plugin_store: Arc<dyn PluginStore> = store.clone();
        let deps = Arc::new(PluginDependencies::new(
            Arc::new(UnavailableRuntime),
            Arc::new(config.plugins.clone()),
            plugin_store,
            events.clone(),
        ));

        let routes = Arc::new(
            RouteTable::new(config.plugins.live_mount)
                .with_reserved_paths(RESERVED_PATHS.iter().copied())
                .with_reserved_patterns(reserved_patterns()),
        );
        let registry = Arc::new(PluginRegistry::new(deps, routes.clone()));

        let mut plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(plugin_demo::DemoPlugin::new()),
            Arc::new(plugin_led::LedPlugin::new()),
        ];
        plugins.extend(options.extra);
        registry.register_all(plugins).await.unwrap();
        registry.boot().await;

        let auth = Arc::new(BearerTokenAuthenticator::new(
            config.server.admin_token.clone(),
        ));
        let state = AppState::new(
            Arc::new(config),
            registry.clone(),
            routes.clone(),
            events.clone(),
            auth,
        );

        Self {
            router: build_router(state),
            registry,
            routes,
            store,
            events,
            leds_dir,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str, token).await
    }

    /// Make an HTTP request with an unvalidated body
    pub async fn raw_request(
        &self,
        method: &str,
        path: &str,
        body: String,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Toggle a plugin through the admin API
    pub async fn toggle(&self, name: &str, enabled: bool, token: Option<&str>) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/plugins/{name}/toggle"),
            Some(serde_json::json!({ "enabled": enabled })),
            token,
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Creates `<root>/<name>/{brightness,trigger}`.
pub fn make_led(root: &TempDir, name: &str, brightness: &str) {
    let dir = root.path().join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("brightness"), brightness).unwrap();
    std::fs::write(dir.join("trigger"), "[none] timer").unwrap();
}

/// Plugin publishing a caller-chosen set of routes.
#[derive(Debug)]
pub struct FixturePlugin {
    name: String,
    build: fn() -> Vec<Route>,
}

impl FixturePlugin {
    pub fn new(name: &str, build: fn() -> Vec<Route>) -> Arc<dyn Plugin> {
        Arc::new(Self {
            name: name.to_string(),
            build,
        })
    }
}

#[async_trait]
impl Plugin for FixturePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Integration test fixture"
    }

    fn version(&self) -> &str {
        "0.0.1"
    }

    async fn init(&self, _ctx: &CancellationToken, _deps: Arc<PluginDependencies>) -> AppResult<()> {
        Ok(())
    }

    async fn start(&self, _ctx: &CancellationToken) -> AppResult<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: &CancellationToken) -> AppResult<()> {
        Ok(())
    }

    fn routes(&self) -> Vec<Route> {
        (self.build)()
    }

    async fn is_enabled(&self) -> bool {
        true
    }
}

fn explode() -> StatusCode {
    panic!("fixture handler exploded")
}

/// Routes of the `faulty` fixture: one that panics, one public.
pub fn faulty_routes() -> Vec<Route> {
    vec![
        Route::get("/api/plugins/faulty/boom", |_req: AxumRequest| async { explode() }),
        Route::get("/api/plugins/faulty/open", |_req: AxumRequest| async {
            StatusCode::NO_CONTENT
        })
        .public(),
    ]
}

/// Routes of the `squatter` fixture, which claims a host path.
pub fn squatter_routes() -> Vec<Route> {
    vec![Route::get("/api/health", |_req: AxumRequest| async {
        StatusCode::OK
    })]
}

/// Routes of the `shadow` fixture, which copy the admin route shapes.
pub fn shadow_routes() -> Vec<Route> {
    vec![
        Route::get("/api/plugins/shadow", |_req: AxumRequest| async {
            StatusCode::OK
        }),
        Route::post("/api/plugins/shadow/toggle", |_req: AxumRequest| async {
            StatusCode::OK
        }),
    ]
}
