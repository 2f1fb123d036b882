//! Common imports for plugin crates.
//!
//! ```ignore
//! use podview_plugin::prelude::*;
//! ```

pub use std::sync::Arc;

pub use async_trait::async_trait;
pub use axum::extract::Request;
pub use axum::http::{Method, StatusCode};
pub use axum::response::{IntoResponse, Response};
pub use tokio_util::sync::CancellationToken;

pub use podview_core::error::AppError;
pub use podview_core::result::AppResult;

pub use crate::base::{BasePlugin, read_json, write_json};
pub use crate::deps::PluginDependencies;
pub use crate::route::Route;
pub use crate::traits::{Plugin, PluginDescriptor};
