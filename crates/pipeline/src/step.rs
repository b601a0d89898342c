//! `PipelineStep` and the ordered list of steps that runs a turn's context
//! through them. Grounded in the reference implementation's
//! `pipeline/base.py` (`PipelineStep`, `BasePipeline`).

use crate::error::PipelineStepError;
use async_trait::async_trait;
use std::sync::Arc;
use voice_agent_bus::EventBus;
use voice_agent_core::PipelineContext;

#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Used in error attribution and step lookup; defaults to the type
    /// name, lowercased, with a trailing "step" suffix trimmed.
    fn name(&self) -> &str;

    fn enabled(&self) -> bool {
        true
    }

    async fn process(&self, ctx: &mut PipelineContext, bus: &Arc<EventBus>) -> Result<(), PipelineStepError>;

    /// Runs the step unless disabled or `ctx.skip_remaining` is set,
    /// translating a raised error into `ctx.error` before propagating it.
    async fn call(&self, ctx: &mut PipelineContext, bus: &Arc<EventBus>) -> Result<(), PipelineStepError> {
        if !self.enabled() || ctx.skip_remaining {
            return Ok(());
        }
        match self.process(ctx, bus).await {
            Ok(()) => Ok(()),
            Err(e) => {
                ctx.set_error(self.name(), &e.message);
                Err(e)
            }
        }
    }
}

#[derive(Default)]
pub struct BasePipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl BasePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: Box<dyn PipelineStep>) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn remove_step(&mut self, name: &str) -> bool {
        let before = self.steps.len();
        self.steps.retain(|s| s.name() != name);
        self.steps.len() != before
    }

    pub fn get_step(&self, name: &str) -> Option<&dyn PipelineStep> {
        self.steps.iter().find(|s| s.name() == name).map(|s| s.as_ref())
    }

    pub fn clear_steps(&mut self) {
        self.steps.clear();
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn steps(&self) -> &[Box<dyn PipelineStep>] {
        &self.steps
    }
}
