//! Plugin registry: owns every compiled-in plugin and drives its lifecycle.
//!
//! Entries are created once at boot and never removed. Transitions for one
//! plugin are serialised by a per-entry async mutex; different plugins can
//! activate concurrently and only meet inside the route table's short
//! swap. Panics raised by plugin code during a transition are caught here
//! and turned into a `Failed` state.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock as SyncRwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use podview_core::result::AppResult;

use crate::deps::PluginDependencies;
use crate::error::{LifecyclePhase, PluginError};
use crate::route::RouteKey;
use crate::state::{PluginState, PluginSummary};
use crate::table::RouteMount;
use crate::traits::{Plugin, PluginDescriptor};

/// Result of an administrative toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Plugin name.
    pub plugin: String,
    /// The flag that was persisted.
    pub enabled: bool,
    /// State after the toggle.
    pub state: PluginState,
    /// Whether the change only takes effect after a restart.
    pub restart_required: bool,
}

/// What happened during [`PluginRegistry::boot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootSummary {
    /// Plugins now running.
    pub activated: Vec<String>,
    /// Plugins whose activation failed.
    pub failed: Vec<String>,
    /// Plugins left disabled.
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone)]
struct EntryStatus {
    state: PluginState,
    last_error: Option<String>,
    mounted: Vec<RouteKey>,
}

/// One registered plugin.
struct Entry {
    descriptor: PluginDescriptor,
    plugin: Arc<dyn Plugin>,
    /// Serialises transitions. Holds the activation's token while active.
    transition: Mutex<Option<CancellationToken>>,
    /// Readable without waiting for an in-flight transition.
    status: SyncRwLock<EntryStatus>,
}

impl Entry {
    fn new(plugin: Arc<dyn Plugin>) -> Self {
        Self {
            descriptor: plugin.descriptor(),
            plugin,
            transition: Mutex::new(None),
            status: SyncRwLock::new(EntryStatus {
                state: PluginState::Registered,
                last_error: None,
                mounted: Vec::new(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn state(&self) -> PluginState {
        self.status.read().state
    }

    fn set_state(&self, state: PluginState) {
        self.status.write().state = state;
    }

    fn set_failed(&self, reason: String) {
        let mut status = self.status.write();
        status.state = PluginState::Failed;
        status.last_error = Some(reason);
        status.mounted.clear();
    }
}

#[derive(Default)]
struct Entries {
    order: Vec<Arc<Entry>>,
    by_name: HashMap<String, Arc<Entry>>,
}

/// Registry of all compiled-in plugins.
pub struct PluginRegistry {
    /// Registered entries, in registration order.
    entries: RwLock<Entries>,
    /// Bundle handed to every `init`.
    deps: Arc<PluginDependencies>,
    /// Host dispatch surface.
    routes: Arc<dyn RouteMount>,
    /// Parent of every activation token; cancelled on shutdown.
    shutdown: CancellationToken,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new(deps: Arc<PluginDependencies>, routes: Arc<dyn RouteMount>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            deps,
            routes,
            shutdown: CancellationToken::new(),
        }
    }

    /// Registers a single plugin in `Registered` state.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        self.register_all(vec![plugin]).await
    }

    /// Registers every compiled-in plugin. Boot-time only.
    ///
    /// A duplicate name rejects the whole batch.
    pub async fn register_all(&self, plugins: Vec<Arc<dyn Plugin>>) -> Result<(), PluginError> {
        let mut entries = self.entries.write().await;

        let mut seen: Vec<&str> = Vec::with_capacity(plugins.len());
        for plugin in &plugins {
            let name = plugin.name();
            if entries.by_name.contains_key(name) || seen.contains(&name) {
                return Err(PluginError::Registration {
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }

        for plugin in plugins {
            let entry = Arc::new(Entry::new(plugin));
            info!(
                plugin = %entry.descriptor.name,
                version = %entry.descriptor.version,
                "Registering plugin"
            );
            entries
                .by_name
                .insert(entry.descriptor.name.clone(), Arc::clone(&entry));
            entries.order.push(entry);
        }

        Ok(())
    }

    async fn entry(&self, name: &str) -> Result<Arc<Entry>, PluginError> {
        self.entries
            .read()
            .await
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    async fn ordered(&self) -> Vec<Arc<Entry>> {
        self.entries.read().await.order.clone()
    }

    /// Activates every plugin whose persisted flag is set, in registration
    /// order. Failures are logged and do not stop the boot.
    pub async fn boot(&self) -> BootSummary {
        let mut summary = BootSummary::default();

        for entry in self.ordered().await {
            let name = entry.name().to_string();
            if !self.desired_flag(&name).await {
                debug!(plugin = %name, "Plugin disabled, skipping activation");
                summary.disabled.push(name);
                continue;
            }

            let mut active = entry.transition.lock().await;
            match self.activate_locked(&entry, &mut active).await {
                Ok(()) => summary.activated.push(name),
                Err(_) => summary.failed.push(name),
            }
        }

        info!(
            activated = summary.activated.len(),
            failed = summary.failed.len(),
            disabled = summary.disabled.len(),
            "Plugin boot complete"
        );
        summary
    }

    /// Runs `init`, `start`, and publishes the plugin's routes.
    ///
    /// On any failure the plugin is stopped best-effort, parked in
    /// `Failed`, and none of its routes are published. Activating a running
    /// plugin is a no-op.
    pub async fn activate(&self, name: &str) -> Result<(), PluginError> {
        let entry = self.entry(name).await?;
        let mut active = entry.transition.lock().await;
        self.activate_locked(&entry, &mut active).await
    }

    /// Unpublishes the plugin's routes, then stops it.
    ///
    /// Requests dispatched before the routes were removed may still be
    /// running while `stop` executes; plugins synchronise that themselves.
    pub async fn deactivate(&self, name: &str) -> Result<(), PluginError> {
        let entry = self.entry(name).await?;
        let mut active = entry.transition.lock().await;
        self.deactivate_locked(&entry, &mut active).await;
        Ok(())
    }

    /// Persists the desired flag, then activates or deactivates.
    ///
    /// The flag is written before anything else so that a crash between
    /// the two steps still boots into the requested state.
    pub async fn toggle(&self, name: &str, enabled: bool) -> Result<ToggleOutcome, PluginError> {
        let entry = self.entry(name).await?;
        let mut active = entry.transition.lock().await;

        self.deps
            .store
            .set_enabled(name, enabled)
            .await
            .map_err(|source| PluginError::Persistence {
                name: name.to_string(),
                source,
            })?;
        info!(plugin = %name, enabled, "Plugin enabled flag persisted");

        let outcome = |restart_required: bool| ToggleOutcome {
            plugin: name.to_string(),
            enabled,
            state: entry.state(),
            restart_required,
        };

        if !self.routes.supports_live_mount() {
            info!(plugin = %name, "Live mounting unavailable, restart required");
            return Ok(outcome(true));
        }

        if enabled {
            self.activate_locked(&entry, &mut active).await?;
            return Ok(outcome(false));
        }

        if entry.state() == PluginState::Failed && active.is_none() {
            info!(plugin = %name, "Plugin is failed with no active instance, restart required");
            return Ok(outcome(true));
        }

        self.deactivate_locked(&entry, &mut active).await;
        Ok(outcome(false))
    }

    /// Stops every active plugin, newest registration first, then cancels
    /// every outstanding plugin token.
    pub async fn shutdown(&self) {
        info!("Stopping plugins");
        for entry in self.ordered().await.into_iter().rev() {
            let mut active = entry.transition.lock().await;
            self.deactivate_locked(&entry, &mut active).await;
        }
        self.shutdown.cancel();
        info!("All plugins stopped");
    }

    /// Summaries of every registered plugin, in registration order.
    pub async fn list(&self) -> Vec<PluginSummary> {
        let mut summaries = Vec::new();
        for entry in self.ordered().await {
            summaries.push(self.summarize(&entry).await);
        }
        summaries
    }

    /// Summary of a single plugin.
    pub async fn get(&self, name: &str) -> Result<PluginSummary, PluginError> {
        let entry = self.entry(name).await?;
        Ok(self.summarize(&entry).await)
    }

    /// Current lifecycle state of a plugin.
    pub async fn state(&self, name: &str) -> Result<PluginState, PluginError> {
        Ok(self.entry(name).await?.state())
    }

    /// Persisted desired flag of a plugin.
    pub async fn is_enabled(&self, name: &str) -> Result<bool, PluginError> {
        self.entry(name).await?;
        Ok(self.desired_flag(name).await)
    }

    /// Names of all registered plugins, in registration order.
    #[cfg(test)]
    async fn names(&self) -> Vec<String> {
        self.ordered()
            .await
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    /// Whether toggles take effect without a restart.
    pub fn supports_live_mount(&self) -> bool {
        self.routes.supports_live_mount()
    }

    async fn summarize(&self, entry: &Entry) -> PluginSummary {
        let enabled = self.desired_flag(entry.name()).await;
        let status = entry.status.read().clone();
        PluginSummary::new(
            &entry.descriptor,
            enabled,
            status.state,
            status.last_error,
            status.mounted.len(),
        )
    }

    /// Persisted flag, falling back to the configured default list when
    /// nothing is stored or the store cannot be read.
    async fn desired_flag(&self, name: &str) -> bool {
        match self.deps.store.get_enabled(name).await {
            Ok(Some(enabled)) => enabled,
            Ok(None) => self.deps.config.enabled_by_default(name),
            Err(e) => {
                let err = PluginError::Configuration {
                    name: name.to_string(),
                    reason: e.to_string(),
                };
                warn!(plugin = %name, error = %err, "Using configured default enabled flag");
                self.deps.config.enabled_by_default(name)
            }
        }
    }

    async fn activate_locked(
        &self,
        entry: &Entry,
        active: &mut Option<CancellationToken>,
    ) -> Result<(), PluginError> {
        let name = entry.name();
        if entry.state() == PluginState::Running {
            debug!(plugin = %name, "Plugin already running");
            return Ok(());
        }

        info!(plugin = %name, version = %entry.descriptor.version, "Activating plugin");
        let ctx = self.shutdown.child_token();

        match self.bring_up(entry, &ctx).await {
            Ok(()) => {
                *active = Some(ctx);
                info!(plugin = %name, routes = entry.status.read().mounted.len(), "Plugin running");
                Ok(())
            }
            Err(err) => {
                error!(plugin = %name, error = %err, "Plugin activation failed");
                if let Err(stop_err) = guarded(name, LifecyclePhase::Stop, entry.plugin.stop(&ctx)).await
                {
                    warn!(plugin = %name, error = %stop_err, "Cleanup after failed activation did not complete");
                }
                ctx.cancel();
                entry.set_failed(err.to_string());
                Err(err)
            }
        }
    }

    async fn bring_up(&self, entry: &Entry, ctx: &CancellationToken) -> Result<(), PluginError> {
        let name = entry.name();

        guarded(name, LifecyclePhase::Init, entry.plugin.init(ctx, Arc::clone(&self.deps))).await?;
        entry.set_state(PluginState::Initialized);

        guarded(name, LifecyclePhase::Start, entry.plugin.start(ctx)).await?;

        let plugin = Arc::clone(&entry.plugin);
        let routes = std::panic::catch_unwind(AssertUnwindSafe(move || plugin.routes())).map_err(
            |payload| PluginError::RecoveredFault {
                name: name.to_string(),
                phase: LifecyclePhase::Routes,
                message: panic_message(payload.as_ref()),
            },
        )?;

        // Held across the swap so observers never see mounted routes on a
        // plugin that is not `Running`.
        let mut status = entry.status.write();
        let mounted = self
            .routes
            .mount(name, routes)
            .map_err(|e| PluginError::Activation {
                name: name.to_string(),
                phase: LifecyclePhase::Mount,
                reason: e.to_string(),
            })?;
        status.state = PluginState::Running;
        status.last_error = None;
        status.mounted = mounted;
        Ok(())
    }

    async fn deactivate_locked(&self, entry: &Entry, active: &mut Option<CancellationToken>) {
        let name = entry.name();
        let state = entry.state();
        if !state.is_active() {
            debug!(plugin = %name, state = %state, "Plugin not active, nothing to deactivate");
            return;
        }

        info!(plugin = %name, "Deactivating plugin");
        {
            let mut status = entry.status.write();
            self.routes.unmount(name);
            status.mounted.clear();
            status.state = PluginState::Initialized;
        }

        let ctx = active.take().unwrap_or_else(|| self.shutdown.child_token());
        if let Err(err) = guarded(name, LifecyclePhase::Stop, entry.plugin.stop(&ctx)).await {
            let err = PluginError::Deactivation {
                name: name.to_string(),
                reason: err.to_string(),
            };
            warn!(plugin = %name, error = %err, "Plugin stop failed");
        }
        ctx.cancel();

        entry.set_state(PluginState::Stopped);
        info!(plugin = %name, "Plugin stopped");
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("routes", &self.routes)
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish()
    }
}

/// Awaits a plugin hook, converting errors and panics into `PluginError`.
async fn guarded<F>(name: &str, phase: LifecyclePhase, hook: F) -> Result<(), PluginError>
where
    F: Future<Output = AppResult<()>>,
{
    match AssertUnwindSafe(hook).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(PluginError::Activation {
            name: name.to_string(),
            phase,
            reason: e.to_string(),
        }),
        Err(payload) => Err(PluginError::RecoveredFault {
            name: name.to_string(),
            phase,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
