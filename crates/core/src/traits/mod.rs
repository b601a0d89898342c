//! Provider-facing traits: `SpeechToText`, `TextToSpeech`, `LanguageModel`,
//! `VoiceActivityDetector`. Every concrete adapter in `voice-agent-providers`
//! implements one of these; the orchestrator and pipeline only ever see the
//! trait object.

mod llm;
mod stt;
mod tts;
mod vad;

pub use llm::{LanguageModel, StreamChunk};
pub use stt::{SpeechToText, TranscriptResult};
pub use tts::TextToSpeech;
pub use vad::{VadResult, VadState, VoiceActivityDetector};
