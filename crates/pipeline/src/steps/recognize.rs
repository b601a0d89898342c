//! Grounded in `pipeline/steps/asr_step.py`. Audio input is transcribed via
//! the session's ASR provider; text input is already `ctx.text` and passes
//! through untouched. An empty audio buffer or a missing provider is a soft
//! failure (`ctx.error`, no raise); an ASR call that errors is a hard one.

use crate::error::PipelineStepError;
use crate::step::PipelineStep;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use voice_agent_bus::EventBus;
use voice_agent_core::{AudioFrame, OutputEvent, PipelineContext, RawInput, SpeechToText};

/// Emitted once ASR assigns `ctx.text`, carrying the final transcript to
/// whatever's listening on the bus (the socket adapter, in the server).
pub const EVENT_TRANSCRIPT: &str = "transcript";
/// String-identical to the orchestrator's own `EVENT_ERROR`; this crate
/// can't depend on the orchestrator crate so it defines its own constant.
pub const EVENT_ERROR: &str = "error";

pub struct RecognizeStep {
    asr: Option<Arc<dyn SpeechToText>>,
}

impl RecognizeStep {
    pub fn new(asr: Option<Arc<dyn SpeechToText>>) -> Self {
        Self { asr }
    }
}

#[async_trait]
impl PipelineStep for RecognizeStep {
    fn name(&self) -> &str {
        "recognize"
    }

    async fn process(&self, ctx: &mut PipelineContext, bus: &Arc<EventBus>) -> Result<(), PipelineStepError> {
        let samples = match &ctx.raw_input {
            RawInput::Text(text) => {
                ctx.text = text.clone();
                return Ok(());
            }
            RawInput::Audio(samples) => samples.clone(),
        };

        if samples.is_empty() {
            ctx.text = String::new();
            ctx.error = Some("[recognize] empty audio input".to_string());
            return Ok(());
        }

        let Some(asr) = &self.asr else {
            ctx.error = Some("[recognize] no ASR provider configured".to_string());
            return Ok(());
        };

        let frame = AudioFrame::new(samples, 16_000);
        match asr.transcribe(&frame).await {
            Ok(result) => {
                ctx.text = result.text.clone();
                bus.emit(OutputEvent::new(
                    EVENT_TRANSCRIPT,
                    json!({ "text": result.text, "is_final": result.is_final }),
                ))
                .await;
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                bus.emit(OutputEvent::new(EVENT_ERROR, json!(message.clone()))).await;
                Err(PipelineStepError::new("recognize", message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait as at;
    use voice_agent_core::{CoreError, Result, TranscriptResult};

    struct StubAsr;

    #[at]
    impl SpeechToText for StubAsr {
        async fn transcribe(&self, _audio: &AudioFrame) -> Result<TranscriptResult> {
            Ok(TranscriptResult {
                text: "transcribed".into(),
                confidence: 1.0,
                is_final: true,
            })
        }
        fn provider_name(&self) -> &str {
            "stub"
        }
    }

    struct FailingAsr;

    #[at]
    impl SpeechToText for FailingAsr {
        async fn transcribe(&self, _audio: &AudioFrame) -> Result<TranscriptResult> {
            Err(CoreError::Other("asr exploded".into()))
        }
        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    async fn recorded_events(bus: &Arc<EventBus>) -> Arc<parking_lot::Mutex<Vec<OutputEvent>>> {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        bus.subscribe_all(
            Arc::new(move |event| {
                seen2.lock().push(event.clone());
                Box::pin(async { Ok(()) })
            }),
            voice_agent_bus::EventPriority::NORMAL,
        );
        seen
    }

    #[tokio::test]
    async fn text_input_is_copied_verbatim() {
        let step = RecognizeStep::new(None);
        let bus = Arc::new(EventBus::new());
        let mut ctx = PipelineContext::new(RawInput::Text("hi there".into()), "User");
        step.process(&mut ctx, &bus).await.unwrap();
        assert_eq!(ctx.text, "hi there");
    }

    #[tokio::test]
    async fn audio_input_is_transcribed() {
        let step = RecognizeStep::new(Some(Arc::new(StubAsr)));
        let bus = Arc::new(EventBus::new());
        let mut ctx = PipelineContext::new(RawInput::Audio(vec![0.1; 512]), "User");
        step.process(&mut ctx, &bus).await.unwrap();
        assert_eq!(ctx.text, "transcribed");
    }

    #[tokio::test]
    async fn successful_transcription_emits_a_transcript_event() {
        let step = RecognizeStep::new(Some(Arc::new(StubAsr)));
        let bus = Arc::new(EventBus::new());
        let seen = recorded_events(&bus).await;
        let mut ctx = PipelineContext::new(RawInput::Audio(vec![0.1; 512]), "User");
        step.process(&mut ctx, &bus).await.unwrap();

        let events = seen.lock();
        let transcript = events.iter().find(|e| e.event_type == EVENT_TRANSCRIPT).expect("transcript event emitted");
        assert_eq!(transcript.data["text"], "transcribed");
        assert_eq!(transcript.data["is_final"], true);
    }

    #[tokio::test]
    async fn asr_failure_emits_an_error_event_and_returns_a_hard_error() {
        let step = RecognizeStep::new(Some(Arc::new(FailingAsr)));
        let bus = Arc::new(EventBus::new());
        let seen = recorded_events(&bus).await;
        let mut ctx = PipelineContext::new(RawInput::Audio(vec![0.1; 512]), "User");
        let result = step.process(&mut ctx, &bus).await;

        assert!(result.is_err());
        let events = seen.lock();
        assert!(events.iter().any(|e| e.event_type == EVENT_ERROR));
    }

    #[tokio::test]
    async fn empty_audio_is_a_soft_failure() {
        let step = RecognizeStep::new(Some(Arc::new(StubAsr)));
        let bus = Arc::new(EventBus::new());
        let mut ctx = PipelineContext::new(RawInput::Audio(vec![]), "User");
        step.process(&mut ctx, &bus).await.unwrap();
        assert_eq!(ctx.text, "");
        assert!(ctx.error.is_some());
    }

    #[tokio::test]
    async fn missing_provider_is_a_soft_failure() {
        let step = RecognizeStep::new(None);
        let bus = Arc::new(EventBus::new());
        let mut ctx = PipelineContext::new(RawInput::Audio(vec![0.1; 512]), "User");
        step.process(&mut ctx, &bus).await.unwrap();
        assert!(ctx.error.is_some());
    }
}
