//! TTS backed by an external HTTP synthesis service returning raw PCM16LE
//! bytes at a fixed sample rate.

use async_trait::async_trait;
use voice_agent_core::{AudioFrame, CoreError, Result, TextToSpeech};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct HttpTtsConfig {
    pub url: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_timeout_ms() -> u64 {
    30_000
}

pub struct HttpTextToSpeech {
    config: HttpTtsConfig,
    client: reqwest::Client,
}

impl HttpTextToSpeech {
    pub fn new(config: HttpTtsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextToSpeech for HttpTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioFrame> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?
            .error_for_status()
            .map_err(|e| CoreError::Transient(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?;
        Ok(AudioFrame::from_i16_bytes(&bytes, self.config.sample_rate))
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
