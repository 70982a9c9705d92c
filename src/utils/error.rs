//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use carewise_llm::LlmError;

use crate::services::planning::PlannerError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration parse errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Query planning failed (retries exhausted or generator unreachable)
    #[error(transparent)]
    Planner(#[from] PlannerError),

    /// Text-completion provider errors outside the planner
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Domain rule violations reported by the core crate
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<carewise_core::CoreError> for AppError {
    fn from(err: carewise_core::CoreError) -> Self {
        match err {
            carewise_core::CoreError::Config(msg) => Self::Config(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}
