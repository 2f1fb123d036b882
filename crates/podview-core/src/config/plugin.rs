//! Plugin system configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::traits::settings::ConfigAccessor;

/// Plugin system configuration.
///
/// `enabled` and `settings` are the static defaults: the persisted store
/// always wins once it holds a value for a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Whether plugin routes may be mounted and unmounted while serving.
    /// When `false`, toggles only persist intent and report that a restart
    /// is required.
    #[serde(default = "default_true")]
    pub live_mount: bool,
    /// Plugins enabled when the store has no persisted flag for them.
    #[serde(default)]
    pub enabled: Vec<String>,
    /// Plugin name → setting key → value.
    #[serde(default)]
    pub settings: HashMap<String, HashMap<String, String>>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            live_mount: true,
            enabled: Vec::new(),
            settings: HashMap::new(),
        }
    }
}

impl PluginConfig {
    fn namespace(&self, plugin: &str) -> Option<&HashMap<String, String>> {
        self.settings
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(plugin))
            .map(|(_, settings)| settings)
    }
}

impl ConfigAccessor for PluginConfig {
    fn plugin_setting(&self, plugin: &str, key: &str) -> Option<String> {
        self.namespace(plugin)?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
    }

    fn plugin_settings(&self, plugin: &str) -> HashMap<String, String> {
        self.namespace(plugin).cloned().unwrap_or_default()
    }

    fn enabled_by_default(&self, plugin: &str) -> bool {
        self.enabled
            .iter()
            .any(|name| name.trim().eq_ignore_ascii_case(plugin))
    }
}

fn default_true() -> bool {
    true
}
