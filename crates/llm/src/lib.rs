//! Chat-completion clients for the pipeline roles.
//!
//! Every role talks to a hosted model through [`LlmClient`]. Backends are
//! wrapped in [`RetryingClient`] and [`SemaphoredClient`] by
//! [`build_llm_client`].

pub mod anthropic;
pub mod client;
pub mod config;
pub mod openai;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{LlmConfig, SemaphoredClient, build_llm_client, build_llm_client_shared};
pub use openai::OpenAiClient;
pub use retry::{RetryConfig, RetryingClient};
