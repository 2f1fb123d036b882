//! Import and export of plugin state as a `plugins.json` document.

use std::collections::HashMap;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use podview_core::error::{AppError, ErrorKind};
use podview_core::result::AppResult;
use podview_core::traits::PluginStore;
use podview_core::traits::store::PluginRecord;

/// Copies every record from the JSON document at `path` into `store`.
///
/// A missing document is not an error and imports nothing. Returns the
/// number of plugins imported.
pub async fn migrate_from_json(path: &Path, store: &dyn PluginStore) -> AppResult<usize> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No legacy plugin state to import");
            return Ok(0);
        }
        Err(e) => {
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read legacy plugin state: {}", path.display()),
                e,
            ));
        }
    };

    let records: HashMap<String, PluginRecord> = serde_json::from_slice(&data).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Failed to parse legacy plugin state: {}", path.display()),
            e,
        )
    })?;

    let count = records.len();
    for (name, record) in records {
        store.put_record(&name, record).await.map_err(|e| {
            warn!(plugin = %name, error = %e, "Plugin state import failed");
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to import plugin '{name}'"),
                e,
            )
        })?;
    }

    info!(path = %path.display(), plugins = count, "Legacy plugin state imported");
    Ok(count)
}

/// Seeds an empty `store` from the legacy document at `path`.
///
/// Once the store holds any record it is authoritative and the document is
/// ignored, so state persisted after the first import survives restarts.
pub async fn import_legacy(path: &Path, store: &dyn PluginStore) -> AppResult<usize> {
    let existing = store.list_plugins().await?;
    if !existing.is_empty() {
        info!(
            path = %path.display(),
            plugins = existing.len(),
            "Plugin state already present, skipping legacy import"
        );
        return Ok(0);
    }
    migrate_from_json(path, store).await
}

/// Writes every record in `store` to `path` as pretty-printed JSON.
pub async fn export_to_json(store: &dyn PluginStore, path: &Path) -> AppResult<usize> {
    let records = store.list_plugins().await?;
    let data = serde_json::to_vec_pretty(&records)?;

    fs::write(path, &data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to export plugin state: {}", path.display()),
            e,
        )
    })?;

    info!(path = %path.display(), plugins = records.len(), "Plugin state exported");
    Ok(records.len())
}
