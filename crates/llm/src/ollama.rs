//! Ollama Provider
//!
//! Implementation of the LlmProvider trait for local Ollama inference using
//! the ollama-rs native SDK. The SDK client is given a reqwest client that
//! carries the configured request timeout and proxy.

use std::time::Duration;

use async_trait::async_trait;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::error::OllamaError;
use ollama_rs::generation::chat::{ChatMessage, ChatMessageResponse, MessageRole as OllamaRole};
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;

use crate::http_client::build_http_client;
use crate::provider::LlmProvider;
use crate::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageRole, ProviderConfig,
};

/// Default Ollama API endpoint
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

const OLLAMA_DEFAULT_PORT: u16 = 11434;

/// Ollama provider for local inference using the native ollama-rs SDK
pub struct OllamaProvider {
    config: ProviderConfig,
    client: Ollama,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given configuration.
    ///
    /// Fails when the base URL cannot be parsed or the HTTP client cannot
    /// be built from the proxy settings.
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string());

        let parsed = url::Url::parse(&base_url).map_err(|e| LlmError::InvalidRequest {
            message: format!("Invalid Ollama URL '{}': {}", base_url, e),
        })?;
        let host = parsed.host_str().unwrap_or("localhost");
        let port = parsed.port().unwrap_or(OLLAMA_DEFAULT_PORT);
        // Ollama::new_with_client takes host and port separately
        let host_url = format!("{}://{}", parsed.scheme(), host);

        let http_client = build_http_client(
            Duration::from_secs(config.timeout_secs),
            config.proxy.as_ref(),
        )
        .map_err(|e| LlmError::InvalidRequest {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        let client = Ollama::new_with_client(host_url, port, http_client);
        Ok(Self { config, client })
    }

    /// Get the base URL for the Ollama server (used in error messages)
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OLLAMA_DEFAULT_URL)
    }

    fn build_chat_request(
        &self,
        messages: &[Message],
        system: Option<&str>,
        request_options: &LlmRequestOptions,
    ) -> ChatMessageRequest {
        let mut chat_messages: Vec<ChatMessage> = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            chat_messages.push(ChatMessage::system(sys.to_string()));
        }
        for msg in messages {
            let role = match msg.role {
                MessageRole::User => OllamaRole::User,
                MessageRole::Assistant => OllamaRole::Assistant,
                MessageRole::System => OllamaRole::System,
            };
            chat_messages.push(ChatMessage::new(role, msg.content.clone()));
        }

        let temperature = request_options
            .temperature_override
            .unwrap_or(self.config.temperature);
        let mut opts = ModelOptions::default().temperature(temperature);
        if self.config.max_tokens > 0 {
            opts = opts.num_predict(self.config.max_tokens as i32);
        }

        ChatMessageRequest::new(self.config.model.clone(), chat_messages).options(opts)
    }

    fn convert_response(&self, response: &ChatMessageResponse) -> LlmResponse {
        let content = strip_think_blocks(&response.message.content);
        LlmResponse {
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
        }
    }

    /// Map an SDK error onto the provider error taxonomy.
    ///
    /// Transport failures become `Timeout`, `ProviderUnavailable` or
    /// `NetworkError`. A reply with a non-success status arrives from the SDK
    /// as `Other(body)` and becomes `ModelNotFound` or `ServerError`.
    fn classify_error(&self, err: OllamaError) -> LlmError {
        match err {
            OllamaError::ReqwestError(e) => self.classify_transport(e),
            OllamaError::Other(body) => self.classify_reply(body, None),
            OllamaError::InternalError(internal) => self.classify_reply(internal.message, None),
            OllamaError::JsonError(e) => LlmError::ParseError {
                message: format!("Unreadable reply from Ollama: {}", e),
            },
            other => LlmError::Other {
                message: other.to_string(),
            },
        }
    }

    fn classify_transport(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                message: format!(
                    "Ollama at {} did not answer within {}s",
                    self.base_url(),
                    self.config.timeout_secs
                ),
            }
        } else if err.is_connect() {
            LlmError::ProviderUnavailable {
                message: format!("Cannot connect to Ollama at {}: {}", self.base_url(), err),
            }
        } else if let Some(status) = err.status() {
            self.classify_reply(err.to_string(), Some(status.as_u16()))
        } else {
            LlmError::NetworkError {
                message: err.to_string(),
            }
        }
    }

    fn classify_reply(&self, message: String, status: Option<u16>) -> LlmError {
        let lower = message.to_lowercase();
        if status == Some(404) || (lower.contains("model") && lower.contains("not found")) {
            LlmError::ModelNotFound {
                model: self.config.model.clone(),
            }
        } else {
            LlmError::ServerError { message, status }
        }
    }
}

/// Drop `<think>...</think>` reasoning blocks emitted by reasoning models
/// (deepseek-r1, qwq) so callers only see the final answer text.
fn strip_think_blocks(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    loop {
        match rest.find("<think>") {
            Some(start) => {
                out.push_str(&rest[..start]);
                let after = &rest[start + "<think>".len()..];
                match after.find("</think>") {
                    Some(end) => rest = &after[end + "</think>".len()..],
                    // Unterminated block: everything after it is reasoning.
                    None => break,
                }
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out.trim().to_string()
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let request = self.build_chat_request(&messages, system.as_deref(), &request_options);

        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            "sending chat request to Ollama"
        );

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| self.classify_error(e))?;

        Ok(self.convert_response(&response))
    }

    async fn health_check(&self) -> LlmResult<()> {
        // Use the SDK's list_local_models as a health check
        self.client
            .list_local_models()
            .await
            .map_err(|e| self.classify_error(e))?;
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn list_models(&self) -> LlmResult<Option<Vec<String>>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| self.classify_error(e))?;

        Ok(Some(models.into_iter().map(|m| m.name).collect()))
    }
}
