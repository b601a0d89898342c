use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// One piece of a streaming agent reply.
///
/// `Text`/`Sentence` chunks carry plain body text (the output pipeline
/// treats them identically); `ToolCall` is forwarded to the bus untouched
/// for a handler to act on.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    Text(String),
    Sentence(String),
    ToolCall(serde_json::Value),
}

impl StreamChunk {
    pub fn text_body(&self) -> Option<&str> {
        match self {
            StreamChunk::Text(s) | StreamChunk::Sentence(s) => Some(s),
            StreamChunk::ToolCall(_) => None,
        }
    }
}

/// Streaming chat/completion provider. One instance per session so
/// conversation history stays isolated.
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Begin a streaming reply to `text`. The stream ends when the model
    /// has nothing more to say; the orchestrator drives it to exhaustion or
    /// stops early on interrupt.
    fn chat_stream<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>>;

    fn provider_name(&self) -> &str;
}
