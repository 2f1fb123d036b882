//! Bounded in-memory event log.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use podview_core::traits::EventSink;

/// A single recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Time-ordered identifier.
    pub id: Uuid,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Dotted event type, e.g. `plugin.demo.started`.
    pub event_type: String,
    /// Who caused the event.
    pub actor: String,
    /// Origin such as a client IP. Empty for internal events.
    pub source: String,
    /// Whether the action succeeded.
    pub success: bool,
    /// Free-form description.
    pub details: String,
}

/// Ring buffer of the most recent events. The oldest event is dropped once
/// `capacity` is reached.
#[derive(Debug)]
pub struct MemoryEventStore {
    events: Mutex<VecDeque<EventRecord>>,
    capacity: usize,
}

impl MemoryEventStore {
    /// Creates an empty log holding at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Up to `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<EventRecord> {
        self.events.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Up to `limit` events whose type starts with `prefix`, newest first.
    pub fn recent_matching(&self, prefix: &str, limit: usize) -> Vec<EventRecord> {
        self.events
            .lock()
            .iter()
            .rev()
            .filter(|event| event.event_type.starts_with(prefix))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events are stored.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Maximum number of retained events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EventSink for MemoryEventStore {
    fn add(&self, event_type: &str, actor: &str, source: &str, success: bool, details: &str) {
        let record = EventRecord {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            actor: actor.to_string(),
            source: source.to_string(),
            success,
            details: details.to_string(),
        };
        debug!(event_type, actor, success, "Event recorded");

        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(record);
    }
}
