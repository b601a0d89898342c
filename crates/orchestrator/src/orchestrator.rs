//! Owns one session's conversational turn. Grounded in the reference
//! implementation's `orchestrator.py`: assembles the default input pipeline,
//! holds one event bus and router, exposes handler registration that
//! proxies to the router, and drives the nine-step turn algorithm.

use crate::error::OrchestratorError;
use crate::result::ConversationResult;
use crate::service_context::ServiceContext;
use base64::Engine;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use voice_agent_bus::{EventBus, EventPriority, EventRouter, Handler};
use voice_agent_core::{OutputEvent, RawInput};
use voice_agent_pipeline::{default_input_pipeline, emotion, InputPipeline, OutputPipeline};

pub const EVENT_EXPRESSION: &str = "expression";
pub const EVENT_AUDIO: &str = "audio";
pub const EVENT_AUDIO_WITH_EXPRESSION: &str = "audio_with_expression";
pub const EVENT_ERROR: &str = "error";

pub struct Orchestrator {
    service: ServiceContext,
    input_pipeline: InputPipeline,
    output_pipeline: OutputPipeline,
    bus: Arc<EventBus>,
    router: Arc<EventRouter>,
    started: AtomicBool,
    interrupted: AtomicBool,
    /// Directory synthesized turn audio is written to. `None` skips writing
    /// audio to disk even when a TTS provider is configured.
    audio_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(service: ServiceContext) -> Self {
        let bus = Arc::new(EventBus::new());
        let router = Arc::new(EventRouter::new(bus.clone()));
        let input_pipeline = default_input_pipeline(service.asr.clone());
        Self {
            service,
            input_pipeline,
            output_pipeline: OutputPipeline::new(),
            bus,
            router,
            started: AtomicBool::new(false),
            interrupted: AtomicBool::new(false),
            audio_dir: None,
        }
    }

    pub fn with_audio_dir(mut self, dir: PathBuf) -> Self {
        self.audio_dir = Some(dir);
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn register_handler(&self, event_type: impl Into<String>, handler: Arc<dyn Handler>, priority: EventPriority) {
        self.router.register(event_type, handler, priority);
    }

    pub fn register_many(&self, event_types: &[&str], handler: Arc<dyn Handler>, priority: EventPriority) {
        self.router.register_many(event_types, handler, priority);
    }

    pub fn start(&self) {
        if !self.started.swap(true, Ordering::SeqCst) {
            self.router.setup();
        }
    }

    pub fn stop(&self) {
        self.router.clear();
        self.started.store(false, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Barge-in: stops the output pipeline mid-stream, skips any in-flight
    /// TTS, and fires a "surprised" expression. Callable at any time.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.output_pipeline.interrupt();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            bus.emit(expression_event("surprised")).await;
        });
    }

    pub async fn process_input(
        &self,
        raw: RawInput,
        metadata: HashMap<String, serde_json::Value>,
        from_name: impl Into<String> + Send,
    ) -> ConversationResult {
        self.start();
        self.interrupted.store(false, Ordering::SeqCst);

        let mut ctx = self.input_pipeline.execute(raw, metadata, None, from_name, &self.bus).await;
        if let Some(err) = &ctx.error {
            return ConversationResult::failed(err.clone());
        }
        if self.is_interrupted() {
            return ConversationResult::interrupted();
        }

        self.bus.emit(expression_event("thinking")).await;
        let input_text = ctx.text.clone();
        let stream = self.service.llm.chat_stream(&input_text);
        self.bus.emit(expression_event("speaking")).await;

        self.output_pipeline.process(&mut ctx, &self.bus, stream).await;

        if self.is_interrupted() {
            return ConversationResult::interrupted();
        }

        let extraction = emotion::extract(&ctx.response, None);
        ctx.response = extraction.cleaned_text;

        let mut audio_path = None;
        if let Some(tts) = &self.service.tts {
            if !self.is_interrupted() {
                match self.synthesize_turn(tts.as_ref(), &ctx.response, &extraction.tags).await {
                    Ok(path) => audio_path = path,
                    Err(e) => {
                        tracing::warn!(error = %e, "tts synthesis failed, continuing without audio");
                    }
                }
            }
        }

        self.bus.emit(expression_event("idle")).await;

        let mut result = ConversationResult::ok(ctx.response, audio_path.map(|p| p.to_string_lossy().into_owned()));
        result.metadata = ctx.metadata;
        result
    }

    async fn synthesize_turn(
        &self,
        tts: &dyn voice_agent_core::TextToSpeech,
        text: &str,
        tags: &[voice_agent_core::EmotionTag],
    ) -> Result<Option<PathBuf>, OrchestratorError> {
        let audio = tts.synthesize(text).await.map_err(|e| OrchestratorError::Tts(e.to_string()))?;
        let analysis = voice_agent_pipeline::analyze(&audio, voice_agent_pipeline::DEFAULT_ENVELOPE_HZ);

        let emotion_names: Vec<String> = tags.iter().map(|t| t.emotion.clone()).collect();
        let timeline = emotion::build_timeline(&emotion_names, analysis.duration_secs, &emotion::TimelineConfig::default());

        let path = match &self.audio_dir {
            Some(dir) => crate::audio_sink::write_turn_audio(&audio, dir).ok(),
            None => None,
        };
        let wav_bytes = crate::audio_sink::encode_wav_bytes(&audio).map_err(|e| OrchestratorError::Tts(e.to_string()))?;
        let audio_base64 = base64::engine::general_purpose::STANDARD.encode(&wav_bytes);

        let event_type = if emotion_names.is_empty() { EVENT_AUDIO } else { EVENT_AUDIO_WITH_EXPRESSION };
        let payload = json!({
            "duration": analysis.duration_secs,
            "volume_envelope": analysis.volume_envelope,
            "timeline": timeline,
            "audio_path": path.as_ref().map(|p: &PathBuf| p.to_string_lossy().into_owned()),
            "audio_base64": audio_base64,
            "format": "wav",
            "text": text,
        });
        self.bus.emit(OutputEvent::new(event_type, payload)).await;

        Ok(path)
    }
}

fn expression_event(name: &str) -> OutputEvent {
    OutputEvent::new(EVENT_EXPRESSION, json!({ "name": name }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use std::pin::Pin;
    use voice_agent_core::{AudioFrame, LanguageModel, Result, StreamChunk, TextToSpeech};

    struct EchoLlm;

    #[async_trait]
    impl LanguageModel for EchoLlm {
        fn chat_stream<'a>(&'a self, text: &'a str) -> Pin<Box<dyn futures::Stream<Item = Result<StreamChunk>> + Send + 'a>> {
            let reply = format!("[happy] You said: {text}");
            Box::pin(stream::iter(vec![Ok(StreamChunk::Sentence(reply))]))
        }
        fn provider_name(&self) -> &str {
            "echo"
        }
    }

    struct SilentTts;

    #[async_trait]
    impl TextToSpeech for SilentTts {
        async fn synthesize(&self, text: &str) -> Result<AudioFrame> {
            Ok(AudioFrame::new(vec![0.0; (text.len() * 160).max(160)], 16_000))
        }
        fn provider_name(&self) -> &str {
            "silent"
        }
    }

    #[tokio::test]
    async fn process_input_runs_a_full_turn_and_strips_emotion_tags() {
        let service = ServiceContext::new(Arc::new(EchoLlm)).with_tts(Arc::new(SilentTts));
        let orchestrator = Orchestrator::new(service);

        let result = orchestrator.process_input(RawInput::Text("hello".into()), HashMap::new(), "User").await;

        assert!(result.success);
        assert!(!result.response_text.contains("[happy]"));
        assert!(result.response_text.contains("You said: hello"));
    }

    struct SlowLlm;

    #[async_trait]
    impl LanguageModel for SlowLlm {
        fn chat_stream<'a>(&'a self, _text: &'a str) -> Pin<Box<dyn futures::Stream<Item = Result<StreamChunk>> + Send + 'a>> {
            Box::pin(stream::unfold(0u8, |state| async move {
                if state >= 5 {
                    return None;
                }
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Some((Ok(StreamChunk::Sentence(format!("chunk{state} "))), state + 1))
            }))
        }
        fn provider_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn concurrent_interrupt_stops_the_turn_before_completion() {
        let service = ServiceContext::new(Arc::new(SlowLlm));
        let orchestrator = Arc::new(Orchestrator::new(service));
        let handle = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(30)).await;
                orchestrator.interrupt();
            })
        };

        let result = orchestrator.process_input(RawInput::Text("hello".into()), HashMap::new(), "User").await;
        handle.await.unwrap();

        assert!(!result.success);
        assert!(result.interrupted);
    }
}
