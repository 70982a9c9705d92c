//! CareWise LLM
//!
//! Text-completion abstraction used by the query planner and the answer
//! generator:
//! - `LlmProvider` trait and the `complete` prompt-in/text-out helper
//! - Ollama (local inference) through the ollama-rs SDK
//!
//! Also includes the HTTP client factory shared with the evidence source
//! clients.

pub mod http_client;
pub mod ollama;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use ollama::{OllamaProvider, OLLAMA_DEFAULT_URL};
pub use provider::LlmProvider;
pub use types::*;
