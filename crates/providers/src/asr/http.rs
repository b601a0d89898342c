//! ASR backed by an external HTTP transcription service, grounded in the
//! same request/response shape as a sidecar speech service: post raw PCM,
//! get back `{text, confidence}`.

use async_trait::async_trait;
use serde::Deserialize;
use voice_agent_core::{AudioFrame, CoreError, Result, SpeechToText, TranscriptResult};

#[derive(Debug, Clone, Deserialize)]
pub struct HttpAsrConfig {
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Deserialize)]
struct AsrResponse {
    text: String,
    #[serde(default)]
    confidence: f32,
}

pub struct HttpSpeechToText {
    config: HttpAsrConfig,
    client: reqwest::Client,
}

impl HttpSpeechToText {
    pub fn new(config: HttpAsrConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SpeechToText for HttpSpeechToText {
    async fn transcribe(&self, audio: &AudioFrame) -> Result<TranscriptResult> {
        let bytes = audio.to_i16_bytes();
        let response = self
            .client
            .post(&self.config.url)
            .header("content-type", "application/octet-stream")
            .query(&[("sample_rate", audio.sample_rate.to_string())])
            .body(bytes)
            .send()
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?
            .error_for_status()
            .map_err(|e| CoreError::Transient(e.to_string()))?;

        let parsed: AsrResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Other(format!("malformed asr response: {e}")))?;

        Ok(TranscriptResult {
            text: parsed.text,
            confidence: parsed.confidence,
            is_final: true,
        })
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
