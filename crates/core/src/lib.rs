//! Shared types and provider traits for the conversational core.
//!
//! This crate has no behavior of its own: it defines the vocabulary other
//! crates build against — `PipelineContext`, `OutputEvent`, emotion/timeline
//! types, and the `SpeechToText` / `TextToSpeech` / `LanguageModel` /
//! `VoiceActivityDetector` provider traits.

pub mod audio;
pub mod emotion;
pub mod error;
pub mod pipeline_context;
pub mod events;
pub mod traits;

pub use audio::{rms_db, AudioFrame};
pub use emotion::{EmotionTag, TimelineSegment};
pub use error::CoreError;
pub use events::{OutputEvent, SinkMessage};
pub use pipeline_context::{PipelineContext, RawInput};
pub use traits::{
    LanguageModel, SpeechToText, StreamChunk, TextToSpeech, TranscriptResult,
    VadResult, VadState, VoiceActivityDetector,
};

/// Result alias used throughout the provider-facing traits.
pub type Result<T> = std::result::Result<T, CoreError>;
