use std::collections::HashMap;

/// Outcome of one `process_input` call.
#[derive(Debug, Clone)]
pub struct ConversationResult {
    pub success: bool,
    pub response_text: String,
    pub audio_path: Option<String>,
    pub error: Option<String>,
    pub interrupted: bool,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ConversationResult {
    pub fn ok(response_text: String, audio_path: Option<String>) -> Self {
        Self {
            success: true,
            response_text,
            audio_path,
            error: None,
            interrupted: false,
            metadata: HashMap::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response_text: String::new(),
            audio_path: None,
            error: Some(error.into()),
            interrupted: false,
            metadata: HashMap::new(),
        }
    }

    pub fn interrupted() -> Self {
        Self {
            success: false,
            response_text: String::new(),
            audio_path: None,
            error: Some("turn interrupted".to_string()),
            interrupted: true,
            metadata: HashMap::new(),
        }
    }
}
