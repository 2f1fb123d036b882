//! Demonstration plugin for PodView.
//!
//! Shows the minimum a plugin needs: a [`BasePlugin`](podview_plugin::BasePlugin)
//! for identity and helpers, a setting read during `init`, lifecycle events,
//! and a few authenticated JSON routes sharing state with the plugin.

pub mod plugin;

pub use plugin::DemoPlugin;
