use thiserror::Error;

/// A step's hard failure: something raised rather than recording a soft
/// `ctx.error`. Carries the failing step's name so logs and the wrapping
/// handler can attribute it.
#[derive(Debug, Error)]
#[error("[{step_name}] {message}")]
pub struct PipelineStepError {
    pub step_name: String,
    pub message: String,
}

impl PipelineStepError {
    pub fn new(step_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Step(#[from] PipelineStepError),

    #[error("no provider available for {0}")]
    MissingProvider(&'static str),

    #[error("{0}")]
    Other(String),
}
