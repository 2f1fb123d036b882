//! Dependency bundle handed to every plugin's `init`.

use std::sync::Arc;

use podview_core::traits::{ConfigAccessor, ContainerRuntime, EventSink, PluginStore};

/// Shared services available to plugins.
///
/// Built once by the host and shared by `Arc` for the lifetime of the
/// process. Plugins treat it as read-only.
#[derive(Clone)]
pub struct PluginDependencies {
    /// Container runtime client.
    pub containers: Arc<dyn ContainerRuntime>,
    /// Static configuration.
    pub config: Arc<dyn ConfigAccessor>,
    /// Durable enabled flags and settings.
    pub store: Arc<dyn PluginStore>,
    /// Audit event log.
    pub events: Arc<dyn EventSink>,
    /// Parent span for every log record emitted by plugins.
    pub logger: tracing::Span,
}

impl PluginDependencies {
    /// Creates a bundle whose plugin logs nest under a `plugins` span.
    pub fn new(
        containers: Arc<dyn ContainerRuntime>,
        config: Arc<dyn ConfigAccessor>,
        store: Arc<dyn PluginStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            containers,
            config,
            store,
            events,
            logger: tracing::info_span!("plugins"),
        }
    }
}

impl std::fmt::Debug for PluginDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDependencies")
            .field("containers", &self.containers)
            .field("config", &self.config)
            .field("store", &self.store)
            .field("events", &self.events)
            .finish()
    }
}
