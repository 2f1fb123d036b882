//! # podview-storage
//!
//! Persistence for PodView: plugin state stores (in-memory and a JSON
//! document on disk), import/export of plugin state, and a bounded
//! in-memory event log.

pub mod events;
pub mod migrate;
pub mod plugin;

pub use events::{EventRecord, MemoryEventStore};
pub use migrate::{export_to_json, import_legacy, migrate_from_json};
pub use plugin::json_file::JsonFilePluginStore;
pub use plugin::memory::MemoryPluginStore;
