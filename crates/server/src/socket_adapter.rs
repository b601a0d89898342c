//! A thin, stateless translation layer between internal bus events and the
//! wire protocol the client expects. One adapter is mounted per connection;
//! it never mutates the `OutputEvent` it's handed, since other handlers may
//! also be subscribed to the same event.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use voice_agent_bus::Handler;
use voice_agent_core::{OutputEvent, TimelineSegment};
use voice_agent_orchestrator::{EVENT_AUDIO, EVENT_AUDIO_WITH_EXPRESSION, EVENT_ERROR, EVENT_EXPRESSION};
use voice_agent_pipeline::output_pipeline::EVENT_SENTENCE;
use voice_agent_pipeline::steps::recognize::EVENT_TRANSCRIPT;

use crate::wire::{ExpressionSegment, ExpressionTimeline, WsOutbound};

/// The role the wire protocol uses to mark a completed agent turn on the
/// `text` channel, matching the reference implementation's convention of a
/// named sender rather than a boolean "done" flag.
const COMPLETION_SENDER: &str = "AI";

pub struct SocketAdapter {
    sink: UnboundedSender<WsOutbound>,
}

impl SocketAdapter {
    pub fn new(sink: UnboundedSender<WsOutbound>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Handler for SocketAdapter {
    async fn handle(&self, event: &OutputEvent) -> Result<(), String> {
        if let Some(message) = translate(event) {
            self.sink.send(message).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "socket_adapter"
    }
}

fn translate(event: &OutputEvent) -> Option<WsOutbound> {
    match event.event_type.as_str() {
        EVENT_SENTENCE => Some(translate_sentence(event)),
        EVENT_EXPRESSION => Some(translate_expression(event)),
        EVENT_AUDIO => Some(translate_audio(event, false)),
        EVENT_AUDIO_WITH_EXPRESSION => Some(translate_audio(event, true)),
        EVENT_TRANSCRIPT => Some(translate_transcript(event)),
        EVENT_ERROR => Some(translate_error(event)),
        // Internal-only event kinds (e.g. `tool_call`) have no wire
        // counterpart and are dropped here rather than forwarded.
        _ => None,
    }
}

fn translate_sentence(event: &OutputEvent) -> WsOutbound {
    let text = event.data.as_str().unwrap_or_default().to_string();
    let from_name = if event.is_complete() { Some(COMPLETION_SENDER.to_string()) } else { None };
    WsOutbound::Text { text, seq: event.seq, from_name }
}

fn translate_expression(event: &OutputEvent) -> WsOutbound {
    let expression = event.data.get("name").and_then(|v| v.as_str()).unwrap_or("neutral").to_string();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    WsOutbound::Expression { expression, timestamp }
}

fn translate_audio(event: &OutputEvent, with_expression: bool) -> WsOutbound {
    let audio_data = event.data.get("audio_base64").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    // The orchestrator only ever synthesizes WAV today; a future provider
    // adding other container formats would widen this match.
    let format = "wav";
    let text = event.data.get("text").and_then(|v| v.as_str()).unwrap_or_default().to_string();

    if !with_expression {
        return WsOutbound::Audio { audio_data, format, seq: event.seq };
    }

    let segments: Vec<TimelineSegment> = event
        .data
        .get("timeline")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let total_duration = event.data.get("duration").and_then(|v| v.as_f64()).unwrap_or(0.0);
    let volumes: Vec<f32> = event
        .data
        .get("volume_envelope")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    let expressions = ExpressionTimeline {
        segments: segments
            .into_iter()
            .map(|s| ExpressionSegment { emotion: s.emotion, time: s.start_time, duration: s.duration(), intensity: s.intensity })
            .collect(),
        total_duration,
    };

    WsOutbound::AudioWithExpression { audio_data, format, volumes, expressions, text, seq: event.seq }
}

fn translate_transcript(event: &OutputEvent) -> WsOutbound {
    let text = event.data.get("text").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let is_final = event.data.get("is_final").and_then(|v| v.as_bool()).unwrap_or(true);
    WsOutbound::Transcript { text, is_final }
}

fn translate_error(event: &OutputEvent) -> WsOutbound {
    let message = event.data.as_str().map(|s| s.to_string()).unwrap_or_else(|| event.data.to_string());
    WsOutbound::Error { message, seq: Some(event.seq) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc::unbounded_channel;

    async fn run(event: OutputEvent) -> Option<WsOutbound> {
        let (tx, mut rx) = unbounded_channel();
        let adapter = SocketAdapter::new(tx);
        adapter.handle(&event).await.unwrap();
        rx.try_recv().ok()
    }

    #[tokio::test]
    async fn streaming_sentence_delta_has_no_from_name() {
        let event = OutputEvent::new(EVENT_SENTENCE, json!("hello")).with_seq(1);
        match run(event).await.unwrap() {
            WsOutbound::Text { text, from_name, .. } => {
                assert_eq!(text, "hello");
                assert!(from_name.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn completion_marker_carries_the_ai_sender_name() {
        let event = OutputEvent::new(EVENT_SENTENCE, json!("")).with_seq(2).with_metadata("is_complete", json!(true));
        match run(event).await.unwrap() {
            WsOutbound::Text { from_name, .. } => assert_eq!(from_name.as_deref(), Some("AI")),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn expression_event_carries_the_emitted_name() {
        let event = OutputEvent::new(EVENT_EXPRESSION, json!({ "name": "thinking" }));
        match run(event).await.unwrap() {
            WsOutbound::Expression { expression, .. } => assert_eq!(expression, "thinking"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn audio_event_carries_base64_payload_through() {
        let event = OutputEvent::new(EVENT_AUDIO, json!({ "audio_base64": "Zm9v", "format": "wav" })).with_seq(9);
        match run(event).await.unwrap() {
            WsOutbound::Audio { audio_data, seq, .. } => {
                assert_eq!(audio_data, "Zm9v");
                assert_eq!(seq, 9);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_call_events_have_no_wire_counterpart() {
        let event = OutputEvent::new("tool_call", json!({}));
        assert!(run(event).await.is_none());
    }

    #[tokio::test]
    async fn transcript_event_carries_text_and_finality_through() {
        let event = OutputEvent::new(EVENT_TRANSCRIPT, json!({ "text": "hello there", "is_final": true }));
        match run(event).await.unwrap() {
            WsOutbound::Transcript { text, is_final } => {
                assert_eq!(text, "hello there");
                assert!(is_final);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
