//! [`PluginStore`](podview_core::traits::PluginStore) implementations.

pub mod json_file;
pub mod memory;
