//! Event type validation for plugin-emitted events.

use std::sync::LazyLock;

use regex::Regex;

/// Actor recorded for every plugin-emitted event.
pub const PLUGIN_ACTOR: &str = "plugin";

static EVENT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("event type pattern is valid"));

/// Whether `event_type` only contains ASCII letters, digits, `_` and `.`.
///
/// Anything else is rejected before reaching the event sink so plugin
/// events cannot forge log lines or other event namespaces.
pub fn is_valid_event_type(event_type: &str) -> bool {
    EVENT_TYPE.is_match(event_type)
}

/// Full event type recorded for a plugin event: `plugin.<name>.<event>`.
pub fn qualified_event_type(plugin: &str, event_type: &str) -> String {
    format!("{PLUGIN_ACTOR}.{plugin}.{event_type}")
}
