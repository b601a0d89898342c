//! A fixed-response ASR provider for tests and config-less demo runs.

use async_trait::async_trait;
use voice_agent_core::{AudioFrame, Result, SpeechToText, TranscriptResult};

pub struct MockSpeechToText {
    fixed_text: String,
}

impl MockSpeechToText {
    pub fn new(fixed_text: impl Into<String>) -> Self {
        Self {
            fixed_text: fixed_text.into(),
        }
    }
}

impl Default for MockSpeechToText {
    fn default() -> Self {
        Self::new("hello")
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(&self, audio: &AudioFrame) -> Result<TranscriptResult> {
        if audio.samples.is_empty() {
            return Ok(TranscriptResult {
                text: String::new(),
                confidence: 0.0,
                is_final: true,
            });
        }
        Ok(TranscriptResult {
            text: self.fixed_text.clone(),
            confidence: 0.99,
            is_final: true,
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
