//! Grounded in `pipeline/input_pipeline.py`: builds a `PipelineContext` from
//! raw input and runs it through the configured steps. A step's failure is
//! logged and recorded on the context but does not abort the remaining
//! steps — each step already checks `ctx.skip_remaining` itself if it wants
//! to halt the turn.

use crate::step::BasePipeline;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use voice_agent_bus::EventBus;
use voice_agent_core::{PipelineContext, RawInput};

#[derive(Default)]
pub struct InputPipeline {
    base: BasePipeline,
}

impl InputPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_mut(&mut self) -> &mut BasePipeline {
        &mut self.base
    }

    pub async fn execute(
        &self,
        raw_input: RawInput,
        metadata: HashMap<String, Value>,
        images: Option<Vec<Value>>,
        from_name: impl Into<String>,
        bus: &Arc<EventBus>,
    ) -> PipelineContext {
        let mut ctx = PipelineContext::new(raw_input, from_name);
        ctx.metadata = metadata;
        ctx.images = images;

        for step in self.base.steps() {
            if let Err(e) = step.call(&mut ctx, bus).await {
                tracing::warn!(step = step.name(), error = %e, "pipeline step failed, continuing");
            }
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineStepError;
    use crate::step::PipelineStep;
    use async_trait::async_trait;

    struct FailingStep;

    #[async_trait]
    impl PipelineStep for FailingStep {
        fn name(&self) -> &str {
            "failing"
        }
        async fn process(&self, _ctx: &mut PipelineContext, _bus: &Arc<EventBus>) -> Result<(), PipelineStepError> {
            Err(PipelineStepError::new("failing", "boom"))
        }
    }

    struct MarkerStep;

    #[async_trait]
    impl PipelineStep for MarkerStep {
        fn name(&self) -> &str {
            "marker"
        }
        async fn process(&self, ctx: &mut PipelineContext, _bus: &Arc<EventBus>) -> Result<(), PipelineStepError> {
            ctx.text.push_str("-marked");
            Ok(())
        }
    }

    #[tokio::test]
    async fn a_failing_step_does_not_prevent_later_steps_from_running() {
        let mut pipeline = InputPipeline::new();
        pipeline.base_mut().add_step(Box::new(FailingStep));
        pipeline.base_mut().add_step(Box::new(MarkerStep));

        let bus = Arc::new(EventBus::new());
        let ctx = pipeline
            .execute(RawInput::Text("hi".into()), HashMap::new(), None, "User", &bus)
            .await;
        assert!(ctx.error.is_some());
        assert!(ctx.text.ends_with("-marked"));
    }
}
