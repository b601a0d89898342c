use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(String),

    #[error("failed to parse provider response: {0}")]
    Parse(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("missing config field: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Http(e.to_string())
    }
}

impl From<ProviderError> for voice_agent_core::CoreError {
    fn from(e: ProviderError) -> Self {
        voice_agent_core::CoreError::Other(e.to_string())
    }
}
