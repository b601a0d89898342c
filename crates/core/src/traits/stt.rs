use crate::{AudioFrame, Result};
use async_trait::async_trait;

/// Result of one transcription call.
#[derive(Debug, Clone, Default)]
pub struct TranscriptResult {
    pub text: String,
    pub confidence: f32,
    pub is_final: bool,
}

/// Speech-to-text provider. One instance per session.
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    async fn transcribe(&self, audio: &AudioFrame) -> Result<TranscriptResult>;

    /// Provider type identifier, as registered in the provider registry
    /// (e.g. `"mock"`, `"openai"`).
    fn provider_name(&self) -> &str;
}
