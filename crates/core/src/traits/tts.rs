use crate::{AudioFrame, Result};
use async_trait::async_trait;

/// Text-to-speech provider. One instance per session.
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    async fn synthesize(&self, text: &str) -> Result<AudioFrame>;

    fn provider_name(&self) -> &str;
}
