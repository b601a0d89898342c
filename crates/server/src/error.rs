use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("config error: {0}")]
    Config(#[from] voice_agent_config::ConfigError),

    #[error("provider construction failed: {0}")]
    Provider(String),

    #[error("websocket error: {0}")]
    WebSocket(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::SessionNotFound(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Config(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Provider(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::WebSocket(_) => axum::http::StatusCode::BAD_REQUEST,
        }
    }
}
