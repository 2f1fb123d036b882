//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use podview_core::config::AppConfig;
use podview_core::traits::Authenticator;
use podview_plugin::{PluginRegistry, RouteTable};
use podview_storage::MemoryEventStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Plugin lifecycle registry
    pub registry: Arc<PluginRegistry>,
    /// Live plugin routes, read on every request
    pub routes: Arc<RouteTable>,
    /// In-memory event log
    pub events: Arc<MemoryEventStore>,
    /// Credential check for admin and protected plugin routes
    pub auth: Arc<dyn Authenticator>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state, stamping the start time.
    pub fn new(
        config: Arc<AppConfig>,
        registry: Arc<PluginRegistry>,
        routes: Arc<RouteTable>,
        events: Arc<MemoryEventStore>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            registry,
            routes,
            events,
            auth,
            started_at: Instant::now(),
        }
    }
}
