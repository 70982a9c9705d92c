//! Core Error Types
//!
//! Errors raised by the dependency-light domain layer: parsing registry
//! values, validating static rule tables, and configuration checks that live
//! next to the types they guard.

use thiserror::Error;

/// Core error type for the CareWise workspace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string did not name a registered intent or source
    #[error("Parse error: {0}")]
    Parse(String),

    /// A static rule table or value broke an invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
