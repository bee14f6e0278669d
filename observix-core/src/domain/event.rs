//! Event domain type

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The unit of work transported through a pipeline.
///
/// `raw` is always populated, even after normalization: the original line is
/// preserved so downstream consumers survive an indexer failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event timestamp; receive time at the source when the line carries none.
    pub ts: DateTime<Utc>,
    /// The payload as received.
    pub raw: String,
    /// Remote peer identity, when the source knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_addr: Option<String>,
    /// Structured fields produced by normalization plus agent annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl Event {
    /// Create an event stamped with the current receive time.
    pub fn now(raw: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            raw: raw.into(),
            source_addr: None,
            meta: BTreeMap::new(),
        }
    }

    /// Create an event with a known remote peer.
    pub fn from_peer(raw: impl Into<String>, source_addr: impl Into<String>) -> Self {
        Self {
            source_addr: Some(source_addr.into()),
            ..Self::now(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_without_empty_optionals() {
        let event = Event::now("hello");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["raw"], "hello");
        assert!(json.get("source_addr").is_none());
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn event_round_trips_meta() {
        let mut event = Event::from_peer("x", "127.0.0.1:9999");
        event.meta.insert("k".into(), serde_json::json!(1));

        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
