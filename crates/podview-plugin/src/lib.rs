//! # podview-plugin
//!
//! Plugin runtime for PodView. Provides:
//!
//! - The [`Plugin`] contract every compiled-in unit implements
//! - [`BasePlugin`], an optional helper composed by value inside a unit
//!   (logging, namespaced settings, validated events, JSON responses)
//! - [`RouteTable`], a copy-on-write `(method, path) → handler` map read
//!   lock-free by the HTTP dispatcher
//! - [`PluginRegistry`], which drives the lifecycle state machine and
//!   publishes route-table updates, isolating panics inside units

pub mod base;
pub mod deps;
pub mod error;
pub mod events;
pub mod prelude;
pub mod registry;
pub mod route;
pub mod state;
pub mod table;
pub mod traits;

pub use base::{BasePlugin, read_json, write_json};
pub use deps::PluginDependencies;
pub use error::{LifecyclePhase, PluginError};
pub use registry::{BootSummary, PluginRegistry, ToggleOutcome};
pub use route::{Route, RouteHandler, RouteKey};
pub use state::{PluginState, PluginSummary};
pub use table::{MatchedRoute, MountError, RouteMount, RouteTable};
pub use traits::{Plugin, PluginDescriptor};
