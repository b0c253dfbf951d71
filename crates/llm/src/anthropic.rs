use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use starter_common::{Result, StarterError};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize, Debug, Clone)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
    usage: Option<AnthropicUsage>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

pub struct AnthropicClient {
    api_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl AnthropicClient {
    pub fn new(
        api_url: Option<String>,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StarterError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_url: api_url.unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            model,
            api_key,
            http_client,
            temperature: None,
            max_tokens: None,
        })
    }

    /// Sampling settings used when a request leaves them unset.
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn build_body(&self, request: &LlmRequest) -> AnthropicRequest {
        // System turns go in the top-level field, never in messages.
        let messages = request
            .messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    Role::System => return None,
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                Some(AnthropicMessage {
                    role,
                    content: msg.content.clone(),
                })
            })
            .collect();

        AnthropicRequest {
            model: self.model.clone(),
            messages,
            system: request.system_prompt.clone(),
            temperature: request.temperature.or(self.temperature),
            max_tokens: request
                .max_tokens
                .or(self.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        // Anthropic has no keyless mode, so fail here rather than at startup.
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StarterError::Llm("Anthropic API key is not configured (ANTHROPIC_API_KEY)".to_string())
        })?;
        let body = self.build_body(&request);

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| StarterError::Llm(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(StarterError::Llm(format!(
                "Anthropic API error {status}: {body_text}"
            )));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| StarterError::Llm(format!("Failed to parse Anthropic response: {e}")))?;

        let content = parsed
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text)
            .collect::<String>();

        Ok(LlmResponse {
            content,
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
            finish_reason: parsed.stop_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    fn client() -> AnthropicClient {
        AnthropicClient::new(
            None,
            "claude-sonnet-4-20250514".to_string(),
            Some("sk-ant-test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn system_prompt_is_top_level() {
        let request = LlmRequest {
            system_prompt: Some("You are the report writer.".to_string()),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: "stray system turn".to_string(),
                },
                ChatMessage::user("Write the report."),
            ],
            temperature: None,
            max_tokens: None,
        };

        let json = serde_json::to_value(client().build_body(&request)).unwrap();

        assert_eq!(json["system"], "You are the report writer.");
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Write the report.");
    }

    #[test]
    fn max_tokens_has_a_default() {
        let request = LlmRequest::single_turn("s", "u");
        let json = serde_json::to_value(client().build_body(&request)).unwrap();
        assert_eq!(json["max_tokens"], DEFAULT_MAX_TOKENS);
        assert!(json.get("temperature").is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_on_request() {
        // Nothing listens on this port; the key check must come first.
        let client = AnthropicClient::new(
            Some("http://127.0.0.1:9/v1/messages".to_string()),
            "claude-sonnet-4-20250514".to_string(),
            None,
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client
            .complete(LlmRequest::single_turn("s", "u"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ANTHROPIC_API_KEY"), "{err}");
    }
}
