//! The contract every compiled-in plugin satisfies.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use podview_core::result::AppResult;

use crate::deps::PluginDependencies;
use crate::route::Route;

/// Immutable identity of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique name (lowercase, no spaces). The sole identity key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Semantic version.
    pub version: String,
}

impl PluginDescriptor {
    /// Creates a descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
        }
    }
}

/// Trait that all plugins must implement.
///
/// Lifecycle, as driven by the registry:
///
/// 1. [`init`](Plugin::init): at most once per activation attempt. May
///    allocate resources and probe hardware or configuration, but must not
///    start background work.
/// 2. [`start`](Plugin::start): only after a successful `init`. Spawns
///    timers, pollers and other background tasks.
/// 3. [`routes`](Plugin::routes): queried exactly once, right after a
///    successful `start`. The set must stay valid while running.
/// 4. [`stop`](Plugin::stop): releases everything acquired by `init` and
///    `start`. Must tolerate a partially failed `start`.
///
/// `ctx` is cancelled by the registry after `stop` returns and when the host
/// shuts down; background tasks should select on it.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Plugin description.
    fn description(&self) -> &str;

    /// Plugin version.
    fn version(&self) -> &str;

    /// Prepares the plugin.
    async fn init(&self, ctx: &CancellationToken, deps: Arc<PluginDependencies>) -> AppResult<()>;

    /// Starts background activity.
    async fn start(&self, ctx: &CancellationToken) -> AppResult<()>;

    /// Releases everything acquired by `init` and `start`.
    async fn stop(&self, ctx: &CancellationToken) -> AppResult<()>;

    /// HTTP routes served while running. May be empty.
    fn routes(&self) -> Vec<Route>;

    /// Whether the persisted flag says this plugin should run.
    async fn is_enabled(&self) -> bool;

    /// Descriptor built from the identity accessors.
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor::new(self.name(), self.description(), self.version())
    }
}
