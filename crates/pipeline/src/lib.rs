//! Input/output pipelines, the VAD hysteresis state machine, emotion
//! extraction/timeline, and the audio analyzer — the turn-processing layer
//! sitting between the event bus and the orchestrator.

pub mod audio_analyzer;
pub mod emotion;
pub mod error;
pub mod input_pipeline;
pub mod output_pipeline;
pub mod step;
pub mod steps;
pub mod vad;

pub use audio_analyzer::{analyze, AudioAnalysis, DEFAULT_ENVELOPE_HZ};
pub use error::{PipelineError, PipelineStepError};
pub use input_pipeline::InputPipeline;
pub use output_pipeline::OutputPipeline;
pub use step::{BasePipeline, PipelineStep};
pub use steps::{CleanStep, RecognizeStep};
pub use vad::{VadConfig, VadStateMachine};

/// Builds the default input pipeline: recognize (ASR or text passthrough)
/// followed by text cleanup.
pub fn default_input_pipeline(asr: Option<std::sync::Arc<dyn voice_agent_core::SpeechToText>>) -> InputPipeline {
    let mut pipeline = InputPipeline::new();
    pipeline.base_mut().add_step(Box::new(RecognizeStep::new(asr)));
    pipeline.base_mut().add_step(Box::new(CleanStep));
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use voice_agent_bus::EventBus;
    use voice_agent_core::RawInput;

    #[tokio::test]
    async fn default_pipeline_cleans_text_input() {
        let pipeline = default_input_pipeline(None);
        let bus = Arc::new(EventBus::new());
        let ctx = pipeline
            .execute(RawInput::Text("  hi   there  ".into()), HashMap::new(), None, "User", &bus)
            .await;
        assert_eq!(ctx.text, "hi there");
        assert!(ctx.error.is_none());
    }
}
