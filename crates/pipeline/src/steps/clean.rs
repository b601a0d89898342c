//! Grounded in `pipeline/steps/text_clean_step.py`: trims and collapses
//! whitespace in the recognized/typed text before it reaches the LLM.

use crate::error::PipelineStepError;
use crate::step::PipelineStep;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use voice_agent_bus::EventBus;
use voice_agent_core::PipelineContext;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub struct CleanStep;

#[async_trait]
impl PipelineStep for CleanStep {
    fn name(&self) -> &str {
        "clean"
    }

    async fn process(&self, ctx: &mut PipelineContext, _bus: &Arc<EventBus>) -> Result<(), PipelineStepError> {
        let collapsed = WHITESPACE_RUN.replace_all(ctx.text.trim(), " ");
        ctx.text = collapsed.into_owned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_agent_core::RawInput;

    #[tokio::test]
    async fn collapses_internal_whitespace_and_trims_edges() {
        let step = CleanStep;
        let bus = Arc::new(EventBus::new());
        let mut ctx = PipelineContext::new(RawInput::Text("  hello   there\n\tfriend  ".into()), "User");
        step.process(&mut ctx, &bus).await.unwrap();
        assert_eq!(ctx.text, "hello there friend");
    }

    #[tokio::test]
    async fn leaves_already_clean_text_untouched() {
        let step = CleanStep;
        let bus = Arc::new(EventBus::new());
        let mut ctx = PipelineContext::new(RawInput::Text("already clean".into()), "User");
        step.process(&mut ctx, &bus).await.unwrap();
        assert_eq!(ctx.text, "already clean");
    }
}
