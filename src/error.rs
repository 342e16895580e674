use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(signboard::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(signboard::config))]
    Config(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(signboard::component))]
    Component(String),

    #[error("Transport error: {0}")]
    #[diagnostic(
        code(signboard::transport),
        help("the previous content stays on screen until the next refresh succeeds")
    )]
    Transport(String),

    #[error("Malformed sheet: {0}")]
    #[diagnostic(code(signboard::malformed_sheet))]
    MalformedSheet(String),

    #[error("News feed error: {0}")]
    #[diagnostic(code(signboard::feed))]
    Feed(String),

    #[error("Cache error: {0}")]
    #[diagnostic(code(signboard::cache))]
    Cache(String),

    #[error("Override error: {0}")]
    #[diagnostic(code(signboard::override_state))]
    Override(String),

    #[error(transparent)]
    #[diagnostic(code(signboard::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(signboard::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(signboard::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BoardResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create transport errors
pub fn transport_error(message: &str) -> Error {
    Error::Transport(message.to_string())
}

/// Helper to create malformed sheet errors
pub fn sheet_error(message: &str) -> Error {
    Error::MalformedSheet(message.to_string())
}

/// Helper to create news feed errors
pub fn feed_error(message: &str) -> Error {
    Error::Feed(message.to_string())
}

/// Helper to create cache errors
pub fn cache_error(message: &str) -> Error {
    Error::Cache(message.to_string())
}

/// Helper to create override errors
pub fn override_error(message: &str) -> Error {
    Error::Override(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
