//! Read-only access to static configuration.

use std::collections::HashMap;

/// Static configuration as seen by plugins.
pub trait ConfigAccessor: Send + Sync + std::fmt::Debug + 'static {
    /// A single setting from the plugin's namespace.
    fn plugin_setting(&self, plugin: &str, key: &str) -> Option<String>;

    /// Every setting in the plugin's namespace.
    fn plugin_settings(&self, plugin: &str) -> HashMap<String, String>;

    /// Whether the plugin is enabled when nothing has been persisted yet.
    fn enabled_by_default(&self, plugin: &str) -> bool;
}
