//! Container runtime client interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Minimal view of a container, as exposed to plugins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Container ID.
    pub id: String,
    /// Primary container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Runtime state (`running`, `exited`, ...).
    pub state: String,
}

/// The subset of the container runtime API that plugins may use.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + std::fmt::Debug + 'static {
    /// Runtime version string.
    async fn version(&self) -> AppResult<String>;

    /// Lists containers, including stopped ones when `all` is set.
    async fn list_containers(&self, all: bool) -> AppResult<Vec<ContainerSummary>>;
}

/// Runtime stand-in used when no container socket is configured.
///
/// Every call fails with `ServiceUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct UnavailableRuntime;

#[async_trait]
impl ContainerRuntime for UnavailableRuntime {
    async fn version(&self) -> AppResult<String> {
        Err(crate::error::AppError::service_unavailable(
            "Container runtime is not connected",
        ))
    }

    async fn list_containers(&self, _all: bool) -> AppResult<Vec<ContainerSummary>> {
        Err(crate::error::AppError::service_unavailable(
            "Container runtime is not connected",
        ))
    }
}
