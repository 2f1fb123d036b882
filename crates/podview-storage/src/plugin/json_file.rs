//! Plugin store backed by a single JSON document on disk.
//!
//! The document maps plugin names to `{ "enabled": bool, "settings": {..} }`.
//! It is read once at open and rewritten in full on every mutation, via a
//! temporary file renamed over the original.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use podview_core::error::{AppError, ErrorKind};
use podview_core::result::AppResult;
use podview_core::traits::PluginStore;
use podview_core::traits::store::PluginRecord;

type Records = HashMap<String, PluginRecord>;

/// Durable plugin store.
#[derive(Debug)]
pub struct JsonFilePluginStore {
    /// Location of the document.
    path: PathBuf,
    /// In-memory copy; always equal to what was last written.
    records: Mutex<Records>,
}

impl JsonFilePluginStore {
    /// Opens the document at `path`, creating parent directories. A missing
    /// file starts an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create data directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let records = match fs::read(&path).await {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Records::new(),
            Ok(data) => serde_json::from_slice::<Records>(&data).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Corrupt plugin state file: {}", path.display()),
                    e,
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Records::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read plugin state file: {}", path.display()),
                    e,
                ));
            }
        };

        info!(path = %path.display(), plugins = records.len(), "Plugin state store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the records, persists the copy, and
    /// only then makes it current.
    async fn mutate<F>(&self, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut Records),
    {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        change(&mut next);
        write_atomic(&self.path, &next).await?;
        *records = next;
        Ok(())
    }
}

/// Serialises `records` next to `path` and renames it into place.
pub(crate) async fn write_atomic(path: &Path, records: &Records) -> AppResult<()> {
    let data = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, &data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to write plugin state: {}", tmp.display()),
            e,
        )
    })?;
    fs::rename(&tmp, path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to replace plugin state: {}", path.display()),
            e,
        )
    })?;

    debug!(path = %path.display(), bytes = data.len(), "Plugin state written");
    Ok(())
}

#[async_trait]
impl PluginStore for JsonFilePluginStore {
    async fn get_enabled(&self, name: &str) -> AppResult<Option<bool>> {
        Ok(self
            .records
            .lock()
            .await
            .get(name)
            .and_then(|record| record.enabled))
    }

    async fn set_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        self.mutate(|records| {
            records.entry(name.to_string()).or_default().enabled = Some(enabled);
        })
        .await
    }

    async fn get_setting(&self, name: &str, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .records
            .lock()
            .await
            .get(name)
            .and_then(|record| record.settings.get(key).cloned()))
    }

    async fn set_setting(&self, name: &str, key: &str, value: &str) -> AppResult<()> {
        self.mutate(|records| {
            records
                .entry(name.to_string())
                .or_default()
                .settings
                .insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn settings(&self, name: &str) -> AppResult<HashMap<String, String>> {
        Ok(self
            .records
            .lock()
            .await
            .get(name)
            .map(|record| record.settings.clone())
            .unwrap_or_default())
    }

    async fn list_plugins(&self) -> AppResult<HashMap<String, PluginRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn put_record(&self, name: &str, record: PluginRecord) -> AppResult<()> {
        self.mutate(|records| {
            records.insert(name.to_string(), record);
        })
        .await
    }
}
