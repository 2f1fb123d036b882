//! # podview-core
//!
//! Core crate for PodView. Contains the configuration schema, the unified
//! error system, and the narrow traits through which the plugin runtime
//! talks to its external collaborators (container runtime, persistence,
//! event log, authentication).
//!
//! This crate has **no** internal dependencies on other PodView crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
