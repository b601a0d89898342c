use thiserror::Error;

/// Failure modes for config loading, all fatal at startup per the error
/// handling design.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unknown provider type for category {category}: {provider_type}")]
    UnknownDiscriminator {
        category: String,
        provider_type: String,
    },

    #[error("provider fragment at {path} has type {found}, expected schema for {expected}")]
    TypeMismatch {
        path: String,
        found: String,
        expected: String,
    },

    #[error("environment error: {0}")]
    Environment(String),

    #[error("failed to construct provider: {0}")]
    ProviderConstruction(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Environment(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            path: String::new(),
            message: e.to_string(),
        }
    }
}
