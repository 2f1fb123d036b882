//! Lifecycle states and registry views.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::PluginDescriptor;

/// Lifecycle state of a registered plugin.
///
/// `Registered → Initialized → Running → Stopped`, with `Failed` reachable
/// from any activation attempt. Both `Stopped` and `Failed` wait for the
/// next toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Known to the registry; never activated.
    Registered,
    /// `init` succeeded; `start` has not completed.
    Initialized,
    /// Started with routes published.
    Running,
    /// Deliberately stopped.
    Stopped,
    /// An activation attempt failed.
    Failed,
}

impl PluginState {
    /// Whether the plugin holds resources that a deactivation must release.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Initialized | Self::Running)
    }

    /// Coarse status shown by the admin UI.
    pub fn status(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Failed => "error",
            Self::Registered | Self::Initialized | Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Initialized => write!(f, "initialized"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Point-in-time view of one registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSummary {
    /// Plugin name.
    pub name: String,
    /// Plugin description.
    pub description: String,
    /// Plugin version.
    pub version: String,
    /// Persisted desired flag.
    pub enabled: bool,
    /// Current lifecycle state.
    pub state: PluginState,
    /// Coarse status (`running`, `stopped`, `error`).
    pub status: String,
    /// Error from the last failed activation, if any.
    pub last_error: Option<String>,
    /// Number of routes currently published.
    pub routes_count: usize,
}

impl PluginSummary {
    pub(crate) fn new(
        descriptor: &PluginDescriptor,
        enabled: bool,
        state: PluginState,
        last_error: Option<String>,
        routes_count: usize,
    ) -> Self {
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            version: descriptor.version.clone(),
            enabled,
            state,
            status: state.status().to_string(),
            last_error,
            routes_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PluginState::Running.status(), "running");
        assert_eq!(PluginState::Failed.status(), "error");
        assert_eq!(PluginState::Registered.status(), "stopped");
        assert!(PluginState::Initialized.is_active());
        assert!(!PluginState::Failed.is_active());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&PluginState::Initialized).unwrap();
        assert_eq!(json, "\"initialized\"");
    }
}
