//! PodView Server
//!
//! Main entry point that wires the plugin runtime, persistence and HTTP
//! surface together and starts the server.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use podview_api::{
    AppState, BearerTokenAuthenticator, RESERVED_PATHS, build_router, reserved_patterns,
};
use podview_core::config::AppConfig;
use podview_core::error::AppError;
use podview_core::traits::{PluginStore, UnavailableRuntime};
use podview_plugin::{Plugin, PluginDependencies, PluginRegistry, RouteTable};
use podview_storage::{JsonFilePluginStore, MemoryEventStore, import_legacy};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from the config directory and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("PODVIEW_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("PODVIEW_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Every plugin compiled into this binary, in activation order.
fn compiled_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(plugin_demo::DemoPlugin::new()),
        Arc::new(plugin_led::LedPlugin::new()),
    ]
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PodView v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Plugin state store ───────────────────────────────
    let state_path = config.storage.plugin_state_path();
    tracing::info!("Opening plugin state store at {}", state_path.display());
    let store = Arc::new(JsonFilePluginStore::open(state_path).await?);

    if let Some(legacy) = &config.storage.legacy_import {
        let imported = import_legacy(Path::new(legacy), store.as_ref()).await?;
        tracing::info!("Imported {} plugin record(s) from {}", imported, legacy);
    }

    // ── Step 2: Event log and plugin dependencies ────────────────
    let events = Arc::new(MemoryEventStore::new(config.storage.max_events));
    let store: Arc<dyn PluginStore> = store;
    let deps = Arc::new(PluginDependencies::new(
        Arc::new(UnavailableRuntime),
        Arc::new(config.plugins.clone()),
        store,
        events.clone(),
    ));

    // ── Step 3: Route table and plugin registry ──────────────────
    let routes = Arc::new(
        RouteTable::new(config.plugins.live_mount)
            .with_reserved_paths(RESERVED_PATHS.iter().copied())
            .with_reserved_patterns(reserved_patterns()),
    );
    let registry = Arc::new(PluginRegistry::new(deps, routes.clone()));
    registry
        .register_all(compiled_plugins())
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        "Booting plugins (live mount: {})...",
        config.plugins.live_mount
    );
    let summary = registry.boot().await;
    tracing::info!(
        activated = ?summary.activated,
        failed = ?summary.failed,
        disabled = ?summary.disabled,
        "Plugin boot complete"
    );

    // ── Step 4: Build and start HTTP server ──────────────────────
    let auth = Arc::new(BearerTokenAuthenticator::new(
        config.server.admin_token.clone(),
    ));
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(
        Arc::new(config),
        registry.clone(),
        routes,
        events,
        auth,
    );
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("PodView server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)));

    tracing::info!("Stopping plugins...");
    registry.shutdown().await;

    served?;
    tracing::info!("PodView server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
