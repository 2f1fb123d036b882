//! Event log handler.

use axum::Json;
use axum::extract::{Query, State};

use podview_storage::EventRecord;

use crate::dto::request::EventsQuery;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;

/// GET /api/events?limit=N&type=prefix
///
/// Newest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .min(state.events.capacity());

    let events = match query.event_type.as_deref() {
        Some(prefix) if !prefix.is_empty() => state.events.recent_matching(prefix, limit),
        _ => state.events.recent(limit),
    };
    Json(events)
}
