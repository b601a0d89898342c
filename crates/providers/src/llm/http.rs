//! An OpenAI-chat-completions-compatible streaming LLM provider. Works
//! against any endpoint that speaks the same SSE `data: {...}` / `[DONE]`
//! framing, which covers most self-hosted and third-party chat APIs.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use voice_agent_core::{CoreError, LanguageModel, Result, StreamChunk};

#[derive(Debug, Clone, Deserialize)]
pub struct HttpLlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

pub struct HttpLanguageModel {
    config: HttpLlmConfig,
    system_prompt: Option<String>,
    client: reqwest::Client,
}

impl HttpLanguageModel {
    pub fn new(config: HttpLlmConfig, system_prompt: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            config,
            system_prompt,
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    fn chat_stream<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>> {
        Box::pin(async_stream::try_stream! {
            let mut messages = Vec::new();
            if let Some(system) = &self.system_prompt {
                messages.push(ChatMessage { role: "system", content: system });
            }
            messages.push(ChatMessage { role: "user", content: text });

            let mut request = self
                .client
                .post(format!("{}/chat/completions", self.config.base_url))
                .json(&ChatRequest { model: &self.config.model, messages, stream: true });
            if let Some(key) = &self.config.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| CoreError::Transient(e.to_string()))?
                .error_for_status()
                .map_err(|e| CoreError::Transient(e.to_string()))?;

            let mut bytes_stream = response.bytes_stream();
            let mut carry = String::new();
            while let Some(chunk) = bytes_stream.next().await {
                let chunk = chunk.map_err(|e| CoreError::Transient(e.to_string()))?;
                carry.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = carry.find('\n') {
                    let line = carry[..pos].trim().to_string();
                    carry.drain(..=pos);
                    let Some(payload) = line.strip_prefix("data: ") else { continue };
                    if payload == "[DONE]" {
                        return;
                    }
                    let parsed: ChatChunk = match serde_json::from_str(payload) {
                        Ok(p) => p,
                        Err(_) => continue,
                    };
                    if let Some(choice) = parsed.choices.into_iter().next() {
                        if let Some(content) = choice.delta.content {
                            if !content.is_empty() {
                                yield StreamChunk::Text(content);
                            }
                        }
                    }
                }
            }
        })
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
