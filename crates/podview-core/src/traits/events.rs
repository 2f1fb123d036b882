//! Event sink for user-visible audit events.

/// Append-only event log.
///
/// Callers are responsible for validating `event_type` before calling
/// [`EventSink::add`].
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Record an event.
    fn add(&self, event_type: &str, actor: &str, source: &str, success: bool, details: &str);
}
