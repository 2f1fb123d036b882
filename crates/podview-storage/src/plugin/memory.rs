//! In-memory plugin store for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use podview_core::result::AppResult;
use podview_core::traits::PluginStore;
use podview_core::traits::store::PluginRecord;

/// Plugin state held only in memory.
#[derive(Debug, Default)]
pub struct MemoryPluginStore {
    records: RwLock<HashMap<String, PluginRecord>>,
}

impl MemoryPluginStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    pub fn with_records(records: HashMap<String, PluginRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl PluginStore for MemoryPluginStore {
    async fn get_enabled(&self, name: &str) -> AppResult<Option<bool>> {
        Ok(self.records.read().get(name).and_then(|record| record.enabled))
    }

    async fn set_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        self.records
            .write()
            .entry(name.to_string())
            .or_default()
            .enabled = Some(enabled);
        Ok(())
    }

    async fn get_setting(&self, name: &str, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .records
            .read()
            .get(name)
            .and_then(|record| record.settings.get(key).cloned()))
    }

    async fn set_setting(&self, name: &str, key: &str, value: &str) -> AppResult<()> {
        self.records
            .write()
            .entry(name.to_string())
            .or_default()
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn settings(&self, name: &str) -> AppResult<HashMap<String, String>> {
        Ok(self
            .records
            .read()
            .get(name)
            .map(|record| record.settings.clone())
            .unwrap_or_default())
    }

    async fn list_plugins(&self) -> AppResult<HashMap<String, PluginRecord>> {
        Ok(self.records.read().clone())
    }

    async fn put_record(&self, name: &str, record: PluginRecord) -> AppResult<()> {
        self.records.write().insert(name.to_string(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_plugin_has_no_flag() {
        let store = MemoryPluginStore::new();
        assert_eq!(store.get_enabled("demo").await.unwrap(), None);
        assert!(store.settings("demo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_setting_does_not_imply_enabled() {
        let store = MemoryPluginStore::new();
        store.set_setting("led", "LEDS_PATH", "/tmp/leds").await.unwrap();

        assert_eq!(store.get_enabled("led").await.unwrap(), None);
        assert_eq!(
            store.get_setting("led", "LEDS_PATH").await.unwrap().as_deref(),
            Some("/tmp/leds")
        );

        store.set_enabled("led", true).await.unwrap();
        let all = store.list_plugins().await.unwrap();
        assert_eq!(all["led"].enabled, Some(true));
        assert_eq!(all["led"].settings.len(), 1);
    }
}
