//! Narrow interfaces to the collaborators around the plugin runtime.
//!
//! Defined here and implemented by other crates (or by the host binary).

pub mod auth;
pub mod container;
pub mod events;
pub mod settings;
pub mod store;

pub use auth::Authenticator;
pub use container::{ContainerRuntime, UnavailableRuntime};
pub use events::EventSink;
pub use settings::ConfigAccessor;
pub use store::PluginStore;
