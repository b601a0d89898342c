//! The per-session bundle of providers an `Orchestrator` drives. ASR, TTS,
//! and VAD are optional — a text-only or audio-less deployment still gets a
//! working turn loop.

use std::sync::Arc;
use voice_agent_core::{LanguageModel, SpeechToText, TextToSpeech, VoiceActivityDetector};

#[derive(Clone)]
pub struct ServiceContext {
    pub llm: Arc<dyn LanguageModel>,
    pub asr: Option<Arc<dyn SpeechToText>>,
    pub tts: Option<Arc<dyn TextToSpeech>>,
    pub vad: Option<Arc<dyn VoiceActivityDetector>>,
}

impl ServiceContext {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm, asr: None, tts: None, vad: None }
    }

    pub fn with_asr(mut self, asr: Arc<dyn SpeechToText>) -> Self {
        self.asr = Some(asr);
        self
    }

    pub fn with_tts(mut self, tts: Arc<dyn TextToSpeech>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn with_vad(mut self, vad: Arc<dyn VoiceActivityDetector>) -> Self {
        self.vad = Some(vad);
        self
    }
}
