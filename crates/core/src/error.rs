//! Error types shared by provider trait implementors.

use thiserror::Error;

/// Errors a provider adapter (ASR/TTS/LLM/VAD) can raise.
///
/// Mirrors the error kinds named in the error-handling design: auth failures
/// never retry, transient failures are expected to have already exhausted
/// their own backoff by the time they reach here.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("provider unavailable after retries: {0}")]
    Transient(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Other(e.to_string())
    }
}
