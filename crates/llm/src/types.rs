//! LLM Types
//!
//! Core types for text-completion provider interactions.

use serde::{Deserialize, Serialize};

/// Default request timeout for completion calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Outbound HTTP proxy applied to provider and source clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL including scheme, e.g. `http://127.0.0.1:8080` or `socks5://host:1080`
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    /// Only held in memory; never written back out.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
}

/// Per-request options for provider behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmRequestOptions {
    /// Optional temperature override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_override: Option<f32>,
}

/// Configuration for a text-completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL override (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model name to use
    pub model: String,
    /// Maximum tokens to generate (0 = provider default)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional outbound proxy
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub proxy: Option<ProxyConfig>,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "llama3.1:8b".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
        }
    }
}

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    /// Create a simple text message
    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: text.into(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(MessageRole::User, text)
    }
}

/// Complete response from a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Text content of the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl LlmResponse {
    /// Plain text response, as scripted providers in tests produce.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// Error types for LLM operations
///
/// `ProviderUnavailable`, `Timeout` and `NetworkError` describe failures to
/// reach the service; `ModelNotFound`, `ServerError` and `ParseError` describe
/// a service that answered but not with a usable completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmError {
    /// Model not found or not available
    ModelNotFound { model: String },
    /// Invalid request (bad parameters)
    InvalidRequest { message: String },
    /// Non-success reply from the provider; `status` when the transport exposed it
    ServerError {
        message: String,
        status: Option<u16>,
    },
    /// Network/connection error
    NetworkError { message: String },
    /// Request exceeded the configured timeout
    Timeout { message: String },
    /// Reply body could not be decoded
    ParseError { message: String },
    /// Provider not available (e.g., Ollama not running)
    ProviderUnavailable { message: String },
    /// Other error
    Other { message: String },
}

impl LlmError {
    /// Whether the error means the service could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            LlmError::ProviderUnavailable { .. }
                | LlmError::NetworkError { .. }
                | LlmError::Timeout { .. }
        )
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::ModelNotFound { model } => {
                write!(f, "Model not found: {}", model)
            }
            LlmError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
            LlmError::ServerError { message, status } => {
                if let Some(s) = status {
                    write!(f, "Server error ({}): {}", s, message)
                } else {
                    write!(f, "Server error: {}", message)
                }
            }
            LlmError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            LlmError::Timeout { message } => {
                write!(f, "Timed out: {}", message)
            }
            LlmError::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            LlmError::ProviderUnavailable { message } => {
                write!(f, "Provider unavailable: {}", message)
            }
            LlmError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
