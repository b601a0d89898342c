//! `PipelineContext` — the per-turn value threaded through the input pipeline.

use std::collections::HashMap;

/// The raw form a turn's input arrived in, before the recognize step runs.
#[derive(Debug, Clone)]
pub enum RawInput {
    Text(String),
    Audio(Vec<f32>),
}

impl RawInput {
    pub fn is_audio(&self) -> bool {
        matches!(self, RawInput::Audio(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RawInput::Text(_))
    }
}

/// Carries one turn through the input pipeline. Every `PipelineStep` sees
/// and may mutate this; once `skip_remaining` is set, no later step may
/// mutate any other field.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub raw_input: RawInput,
    pub text: String,
    pub images: Option<Vec<serde_json::Value>>,
    pub from_name: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub error: Option<String>,
    pub response: String,
    pub skip_remaining: bool,
}

impl PipelineContext {
    pub fn new(raw_input: RawInput, from_name: impl Into<String>) -> Self {
        let text = match &raw_input {
            RawInput::Text(t) => t.clone(),
            RawInput::Audio(_) => String::new(),
        };
        Self {
            raw_input,
            text,
            images: None,
            from_name: from_name.into(),
            metadata: HashMap::new(),
            error: None,
            response: String::new(),
            skip_remaining: false,
        }
    }

    pub fn set_error(&mut self, step_name: &str, message: impl Into<String>) {
        self.error = Some(format!("[{step_name}] {}", message.into()));
    }

    pub fn skip(&mut self) {
        self.skip_remaining = true;
    }

    pub fn should_skip_history(&self) -> bool {
        self.metadata
            .get("skip_history")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
