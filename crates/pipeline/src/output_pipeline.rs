//! Grounded in `pipeline/output_pipeline.py`: drains the LLM's stream of
//! `StreamChunk`s, emitting a `sentence` event per non-empty chunk and a
//! final empty-body completion marker once the stream ends uninterrupted.

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use voice_agent_bus::EventBus;
use voice_agent_core::{OutputEvent, PipelineContext, Result, StreamChunk};

pub const EVENT_SENTENCE: &str = "sentence";
pub const EVENT_TOOL_CALL: &str = "tool_call";

#[derive(Default)]
pub struct OutputPipeline {
    seq: AtomicU64,
    interrupted: AtomicBool,
}

impl OutputPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.seq.store(0, Ordering::SeqCst);
        self.interrupted.store(false, Ordering::SeqCst);
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Drives `stream` to completion (or interruption), emitting events on
    /// `bus` as it goes, and returns the concatenated response text written
    /// into `ctx.response`.
    pub async fn process(
        &self,
        ctx: &mut PipelineContext,
        bus: &Arc<EventBus>,
        mut stream: Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + '_>>,
    ) -> String {
        self.reset();
        let mut full_response = String::new();

        while let Some(item) = stream.next().await {
            if self.is_interrupted() || ctx.skip_remaining {
                break;
            }
            let chunk = match item {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "llm stream chunk failed");
                    continue;
                }
            };
            match chunk {
                StreamChunk::Text(text) | StreamChunk::Sentence(text) => {
                    full_response.push_str(&text);
                    self.emit_sentence(bus, &text).await;
                }
                StreamChunk::ToolCall(data) => {
                    self.emit_event(bus, EVENT_TOOL_CALL, data).await;
                }
            }
        }

        if !self.is_interrupted() {
            self.emit_completion_marker(bus).await;
        }
        ctx.response = full_response.clone();
        full_response
    }

    async fn emit_sentence(&self, bus: &Arc<EventBus>, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.emit_event(bus, EVENT_SENTENCE, serde_json::Value::String(text.to_string()))
            .await;
    }

    async fn emit_event(&self, bus: &Arc<EventBus>, event_type: &str, data: serde_json::Value) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        bus.emit(OutputEvent::new(event_type, data).with_seq(seq)).await;
    }

    /// Seq is `last + 1` without bumping the counter itself — this is the
    /// turn's terminal emission.
    async fn emit_completion_marker(&self, bus: &Arc<EventBus>) {
        let seq = self.seq.load(Ordering::SeqCst) + 1;
        let event = OutputEvent::new(EVENT_SENTENCE, serde_json::Value::String(String::new()))
            .with_seq(seq)
            .with_metadata("is_complete", serde_json::Value::Bool(true));
        bus.emit(event).await;
    }
}
