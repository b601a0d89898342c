use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("turn input failed: {0}")]
    InputFailed(String),

    #[error("turn interrupted")]
    Interrupted,

    #[error("llm provider error: {0}")]
    Llm(String),

    #[error("tts provider error: {0}")]
    Tts(String),

    #[error(transparent)]
    Core(#[from] voice_agent_core::CoreError),
}
