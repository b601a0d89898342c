//! `OutputEvent` and `SinkMessage` — the bus-level and wire-level output
//! record types.

use std::collections::HashMap;

/// A tagged record emitted through the event bus. `type` is a closed set in
/// practice (`sentence`, `tool_call`, `expression`, `audio`,
/// `audio_with_expression`, `error`, `transcript`, `control`) but is kept as
/// a plain string here so new handler-only event kinds don't require
/// touching this crate.
#[derive(Debug, Clone)]
pub struct OutputEvent {
    pub event_type: String,
    pub data: serde_json::Value,
    pub seq: u64,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl OutputEvent {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            seq: 0,
            metadata: HashMap::new(),
        }
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.metadata
            .get("is_complete")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// The externalized, transport-ready form of a handler's output: a flat
/// key→value map plus the sequencing/priority a socket frontend needs to
/// order it against other sink messages.
#[derive(Debug, Clone)]
pub struct SinkMessage {
    pub message_type: String,
    pub content: serde_json::Map<String, serde_json::Value>,
    pub seq: u64,
    pub priority: i32,
}

impl SinkMessage {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            content: serde_json::Map::new(),
            seq: 0,
            priority: 0,
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.content.insert(key.into(), value);
        self
    }

    /// Flatten to the `{type, ...fields}` shape a JSON-framed transport sends.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = self.content.clone();
        map.insert(
            "type".to_string(),
            serde_json::Value::String(self.message_type.clone()),
        );
        serde_json::Value::Object(map)
    }
}
