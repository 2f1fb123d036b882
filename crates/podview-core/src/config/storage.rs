//! Persistence configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where plugin state and the event log live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// File name of the plugin state document, relative to `data_dir`.
    #[serde(default = "default_state_file")]
    pub plugin_state_file: String,
    /// Optional legacy `plugins.json`, imported at startup while the state
    /// store is still empty.
    #[serde(default)]
    pub legacy_import: Option<String>,
    /// Capacity of the in-memory event log.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

impl StorageConfig {
    /// Full path of the plugin state document.
    pub fn plugin_state_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.plugin_state_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            plugin_state_file: default_state_file(),
            legacy_import: None,
            max_events: default_max_events(),
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_state_file() -> String {
    "plugins.state.json".to_string()
}

fn default_max_events() -> usize {
    1000
}
