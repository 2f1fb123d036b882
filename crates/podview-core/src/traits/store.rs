//! Durable plugin state: enabled flags and namespaced settings.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Persisted state for a single plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Desired enabled flag; `None` until the plugin is first toggled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Plugin-owned settings.
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

/// Persistence adapter consumed by the plugin registry and by plugins.
///
/// The runtime never persists anything directly; every write goes through
/// this trait.
#[async_trait]
pub trait PluginStore: Send + Sync + std::fmt::Debug + 'static {
    /// The persisted enabled flag, or `None` if the plugin has never been
    /// toggled.
    async fn get_enabled(&self, name: &str) -> AppResult<Option<bool>>;

    /// Persist the enabled flag.
    async fn set_enabled(&self, name: &str, enabled: bool) -> AppResult<()>;

    /// A single setting from the plugin's namespace.
    async fn get_setting(&self, name: &str, key: &str) -> AppResult<Option<String>>;

    /// Persist a single setting in the plugin's namespace.
    async fn set_setting(&self, name: &str, key: &str, value: &str) -> AppResult<()>;

    /// All settings stored for a plugin.
    async fn settings(&self, name: &str) -> AppResult<HashMap<String, String>>;

    /// Every persisted plugin record, keyed by plugin name.
    async fn list_plugins(&self) -> AppResult<HashMap<String, PluginRecord>>;

    /// Replace a whole record (used by import/migration).
    async fn put_record(&self, name: &str, record: PluginRecord) -> AppResult<()>;
}
