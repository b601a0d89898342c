//! The client-facing JSON message shapes. Grounded in the reference
//! implementation's `server/src/websocket.rs` tagged-enum pattern, with the
//! exact field shapes taken from the socket protocol this server exposes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsInbound {
    TextInput {
        text: String,
        #[serde(default)]
        metadata: Option<Value>,
        #[serde(default)]
        from_name: Option<String>,
    },
    MicAudioData {
        audio: Vec<f32>,
    },
    RawAudioData {
        audio: Vec<f32>,
    },
    MicAudioEnd {
        #[serde(default)]
        metadata: Option<Value>,
    },
    InterruptSignal {
        #[serde(default)]
        text: Option<String>,
    },
    FetchHistoryList {},
    FetchHistory {
        history_uid: String,
    },
    CreateNewHistory {},
    ClearHistory {},
    SwitchConfig {
        file: String,
    },
    Heartbeat {},
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WsOutbound {
    #[serde(rename = "connection-established")]
    ConnectionEstablished { message: String, sid: String },
    #[serde(rename = "control")]
    Control { text: &'static str },
    #[serde(rename = "transcript")]
    Transcript { text: String, is_final: bool },
    #[serde(rename = "text")]
    Text { text: String, seq: u64, #[serde(skip_serializing_if = "Option::is_none")] from_name: Option<String> },
    #[serde(rename = "audio")]
    Audio { audio_data: String, format: &'static str, seq: u64 },
    #[serde(rename = "audio_with_expression")]
    AudioWithExpression {
        audio_data: String,
        format: &'static str,
        volumes: Vec<f32>,
        expressions: ExpressionTimeline,
        text: String,
        seq: u64,
    },
    #[serde(rename = "expression")]
    Expression { expression: String, timestamp: f64 },
    #[serde(rename = "error")]
    Error { message: String, #[serde(skip_serializing_if = "Option::is_none")] seq: Option<u64> },
    #[serde(rename = "history-list")]
    HistoryList { histories: Vec<HistoryPreview> },
    #[serde(rename = "history-data")]
    HistoryData { messages: Vec<HistoryMessage> },
    #[serde(rename = "history-cleared")]
    HistoryCleared {},
    #[serde(rename = "new-history-created")]
    NewHistoryCreated { history_uid: String },
    #[serde(rename = "heartbeat-ack")]
    HeartbeatAck {},
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionTimeline {
    pub segments: Vec<ExpressionSegment>,
    pub total_duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionSegment {
    pub emotion: String,
    pub time: f64,
    pub duration: f64,
    pub intensity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPreview {
    pub uid: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// Wire-level control strings sent inside `WsOutbound::Control`.
pub mod control {
    pub const START_MIC: &str = "start-mic";
    pub const STOP_MIC: &str = "stop-mic";
    pub const MIC_AUDIO_END: &str = "mic-audio-end";
    pub const CONVERSATION_START: &str = "conversation-start";
    pub const CONVERSATION_END: &str = "conversation-end";
    pub const INTERRUPTED: &str = "interrupted";
    pub const NO_AUDIO_DATA: &str = "no-audio-data";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_input_deserializes_from_tagged_json() {
        let raw = r#"{"type":"text_input","text":"hello"}"#;
        let msg: WsInbound = serde_json::from_str(raw).unwrap();
        matches!(msg, WsInbound::TextInput { text, .. } if text == "hello");
    }

    #[test]
    fn heartbeat_serializes_with_kebab_case_tag() {
        let msg = WsOutbound::HeartbeatAck {};
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "heartbeat-ack");
    }

    #[test]
    fn control_message_carries_a_fixed_text_value() {
        let msg = WsOutbound::Control { text: control::START_MIC };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["text"], "start-mic");
    }

    #[test]
    fn text_completion_marker_omits_from_name_when_absent() {
        let msg = WsOutbound::Text { text: "hi".into(), seq: 1, from_name: None };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("from_name").is_none());
    }
}
