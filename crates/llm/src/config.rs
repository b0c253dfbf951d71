use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use starter_common::{Result, StarterError};

use crate::anthropic::AnthropicClient;
use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::openai::OpenAiClient;
use crate::retry::{RetryConfig, RetryingClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai" or "anthropic"
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_ms: u64,
    pub max_concurrent_requests: usize,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_url: None,
            temperature: None,
            max_tokens: None,
            timeout_ms: 120_000,
            max_concurrent_requests: 2,
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Same provider settings, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self.provider.as_str() {
            "openai" => Some("OPENAI_API_KEY"),
            "anthropic" => Some("ANTHROPIC_API_KEY"),
            _ => None,
        }
    }
}

/// Caps in-flight requests. Share one instance between clients that hit the
/// same account so concurrent pipeline runs respect a single budget.
pub struct SemaphoredClient {
    inner: Arc<dyn LlmClient>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredClient {
    pub fn new(inner: Arc<dyn LlmClient>, max_concurrent: usize) -> Self {
        Self::with_semaphore(
            inner,
            Arc::new(tokio::sync::Semaphore::new(max_concurrent.max(1))),
        )
    }

    pub fn with_semaphore(inner: Arc<dyn LlmClient>, semaphore: Arc<tokio::sync::Semaphore>) -> Self {
        Self { inner, semaphore }
    }
}

#[async_trait]
impl LlmClient for SemaphoredClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| StarterError::Llm(format!("Semaphore acquire failed: {e}")))?;
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

fn build_base_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let timeout = Duration::from_millis(config.timeout_ms);
    let client: Box<dyn LlmClient> = match config.provider.as_str() {
        "openai" => Box::new(OpenAiClient::new(
            config.api_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
            timeout,
        )?
        .with_sampling(config.temperature, config.max_tokens)),
        "anthropic" => Box::new(AnthropicClient::new(
            config.api_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
            timeout,
        )?
        .with_sampling(config.temperature, config.max_tokens)),
        other => {
            return Err(StarterError::Config(format!(
                "Unknown LLM provider: {other}"
            )));
        }
    };
    Ok(client)
}

/// Provider client wrapped in retries and a fresh concurrency limit.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(
        config.max_concurrent_requests.max(1),
    ));
    build_llm_client_shared(config, semaphore)
}

/// Like [`build_llm_client`] but drawing permits from an existing semaphore.
pub fn build_llm_client_shared(
    config: &LlmConfig,
    semaphore: Arc<tokio::sync::Semaphore>,
) -> Result<Arc<dyn LlmClient>> {
    let retrying: Box<dyn LlmClient> = Box::new(RetryingClient::new(
        build_base_client(config)?,
        config.retry.clone(),
    ));
    Ok(Arc::new(SemaphoredClient::with_semaphore(
        Arc::from(retrying),
        semaphore,
    )))
}
