//! Events and hierarchical event-name matching.
//!
//! An event carries a hierarchical dot-separated name (for example
//! `network.message.received`), an opaque JSON payload whose shape is a
//! convention between producer and consumer, and delivery metadata.
//! Events are transient: never persisted, never replayed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event id.
    pub event_id: Uuid,
    /// Who published the event.
    pub source: String,
    /// Publication timestamp (unix millis).
    pub timestamp: i64,
}

impl EventMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            source: source.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// A named event with an opaque payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Hierarchical dot-separated name. Case-sensitive ASCII tokens,
    /// no escaping, no wildcards.
    pub name: String,
    /// Opaque payload; type known only by producer/consumer convention.
    pub payload: serde_json::Value,
    /// Delivery metadata.
    pub metadata: EventMetadata,
}

impl Event {
    /// Create an event published by the default "system" source.
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::with_source(name, payload, "system")
    }

    /// Create an event with an explicit source.
    pub fn with_source(
        name: impl Into<String>,
        payload: serde_json::Value,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            metadata: EventMetadata::new(source),
        }
    }

    /// Whether this event's name is matched by the given pattern.
    pub fn matches(&self, pattern: &str) -> bool {
        name_matches(pattern, &self.name)
    }
}

/// Hierarchical name matching.
///
/// Pattern `p` matches name `n` iff `n == p` or `n` is a strict
/// dot-separated descendant of `p`: `network` matches `network`,
/// `network.message` and `network.message.received`, but not
/// `networking`.
pub fn name_matches(pattern: &str, name: &str) -> bool {
    if name == pattern {
        return true;
    }
    name.len() > pattern.len()
        && name.starts_with(pattern)
        && name.as_bytes()[pattern.len()] == b'.'
}
