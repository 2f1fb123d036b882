//! Plugin runtime error taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use podview_core::error::{AppError, ErrorKind};

/// The lifecycle step during which a plugin failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// `Plugin::init`.
    Init,
    /// `Plugin::start`.
    Start,
    /// `Plugin::routes`.
    Routes,
    /// Publishing routes into the route table.
    Mount,
    /// `Plugin::stop`.
    Stop,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Start => write!(f, "start"),
            Self::Routes => write!(f, "routes"),
            Self::Mount => write!(f, "mount"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// Errors raised by the plugin registry.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Two compiled-in plugins share a name. Fatal at startup.
    #[error("plugin '{name}' is already registered")]
    Registration {
        /// The duplicated name.
        name: String,
    },

    /// `init`/`start` returned an error, or route publication was rejected.
    /// The plugin is parked in `Failed`.
    #[error("plugin '{name}' failed during {phase}: {reason}")]
    Activation {
        /// Plugin name.
        name: String,
        /// Step that failed.
        phase: LifecyclePhase,
        /// Error reported by the plugin or the route table.
        reason: String,
    },

    /// `stop` failed. Logged; never blocks the `Stopped` transition.
    #[error("plugin '{name}' did not stop cleanly: {reason}")]
    Deactivation {
        /// Plugin name.
        name: String,
        /// Error reported by the plugin.
        reason: String,
    },

    /// A persisted value was missing or unreadable; a default was used.
    #[error("configuration for plugin '{name}' is unusable: {reason}")]
    Configuration {
        /// Plugin name.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// The plugin panicked. Treated as an activation failure.
    #[error("plugin '{name}' panicked during {phase}: {message}")]
    RecoveredFault {
        /// Plugin name.
        name: String,
        /// Step that panicked.
        phase: LifecyclePhase,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// No plugin with that name is registered.
    #[error("plugin '{0}' not found")]
    NotFound(String),

    /// The desired state could not be persisted; nothing was changed.
    #[error("failed to persist state for plugin '{name}': {source}")]
    Persistence {
        /// Plugin name.
        name: String,
        /// Store error.
        #[source]
        source: AppError,
    },
}

impl PluginError {
    /// Whether this error parked the plugin in `Failed`.
    pub fn is_activation_failure(&self) -> bool {
        matches!(self, Self::Activation { .. } | Self::RecoveredFault { .. })
    }
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        let message = err.to_string();
        match err {
            PluginError::NotFound(_) => AppError::not_found(message),
            PluginError::Registration { .. } => AppError::conflict(message),
            PluginError::Activation {
                phase: LifecyclePhase::Mount,
                ..
            } => AppError::conflict(message),
            PluginError::Activation { .. }
            | PluginError::RecoveredFault { .. }
            | PluginError::Deactivation { .. } => AppError::plugin(message),
            PluginError::Configuration { .. } => AppError::configuration(message),
            PluginError::Persistence { source, .. } => {
                AppError::with_source(ErrorKind::Storage, message, source)
            }
        }
    }
}
