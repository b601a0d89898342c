//! Synthesizes silence of a duration proportional to the input text, so the
//! rest of the pipeline (timeline calculation, audio framing) has a real
//! `AudioFrame` to work with even with no TTS engine configured.

use async_trait::async_trait;
use voice_agent_core::{AudioFrame, Result, TextToSpeech};

const SAMPLE_RATE: u32 = 16_000;
const SECONDS_PER_CHAR: f64 = 0.06;
const MIN_DURATION_SECS: f64 = 0.3;

pub struct MockTextToSpeech;

impl Default for MockTextToSpeech {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl TextToSpeech for MockTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioFrame> {
        let duration = (text.chars().count() as f64 * SECONDS_PER_CHAR).max(MIN_DURATION_SECS);
        let sample_count = (duration * SAMPLE_RATE as f64).round() as usize;
        Ok(AudioFrame::new(vec![0.0; sample_count], SAMPLE_RATE))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn longer_text_yields_longer_audio() {
        let tts = MockTextToSpeech;
        let short = tts.synthesize("hi").await.unwrap();
        let long = tts
            .synthesize("this is a substantially longer sentence to speak")
            .await
            .unwrap();
        assert!(long.duration_secs() > short.duration_secs());
    }
}
