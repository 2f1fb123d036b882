//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/plugins/{name}/toggle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    /// Desired enabled flag.
    pub enabled: bool,
}

/// Query string of `GET /api/events`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events to return.
    pub limit: Option<usize>,
    /// Only return events whose type starts with this prefix.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}
