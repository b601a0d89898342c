//! A deterministic language model for tests and for running the server with
//! no external API configured. Echoes the input back as a handful of
//! sentence-shaped chunks so the output pipeline's streaming logic has
//! something real to chew on.

use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::pin::Pin;
use voice_agent_core::{LanguageModel, Result, StreamChunk};

pub struct MockLanguageModel {
    name: String,
}

impl MockLanguageModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new("mock")
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    fn chat_stream<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>> {
        let sentences: Vec<String> = text
            .split('.')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| format!("You said: {s}."))
            .collect();
        let sentences = if sentences.is_empty() {
            vec!["I heard you, but there was nothing to repeat back.".to_string()]
        } else {
            sentences
        };
        Box::pin(stream::iter(
            sentences.into_iter().map(|s| Ok(StreamChunk::Sentence(s))),
        ))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn echoes_each_clause_as_a_sentence_chunk() {
        let model = MockLanguageModel::default();
        let chunks: Vec<_> = model
            .chat_stream("hello there. how are you")
            .map(|c| c.unwrap().text_body().unwrap_or_default().to_string())
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("hello there"));
    }

    #[tokio::test]
    async fn empty_input_still_produces_one_chunk() {
        let model = MockLanguageModel::default();
        let chunks: Vec<_> = model.chat_stream("").collect::<Vec<_>>().await;
        assert_eq!(chunks.len(), 1);
    }
}
