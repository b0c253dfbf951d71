use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use starter_common::{Result, StarterError};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Client for any OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(
        base_url: Option<String>,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StarterError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
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

    fn role_to_string(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_body(&self, request: &LlmRequest) -> OpenAiRequest {
        let system = request.system_prompt.iter().map(|s| OpenAiMessage {
            role: "system".to_string(),
            content: Some(s.clone()),
        });
        let rest = request.messages.iter().map(|m| OpenAiMessage {
            role: Self::role_to_string(m.role).to_string(),
            content: Some(m.content.clone()),
        });
        OpenAiRequest {
            model: self.model.clone(),
            messages: system.chain(rest).collect(),
            temperature: request.temperature.or(self.temperature),
            max_tokens: request.max_tokens.or(self.max_tokens),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_body(&request);

        let mut http_req = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| StarterError::Llm(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!(" Retry-After: {v}"))
                .unwrap_or_default();
            let body_text = response.text().await.unwrap_or_default();
            return Err(StarterError::Llm(format!(
                "OpenAI API error {status}: {body_text}{retry_after}"
            )));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| StarterError::Llm(format!("Failed to parse OpenAI response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| StarterError::Llm("No choices in OpenAI response".to_string()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
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

    fn client(base_url: Option<String>) -> OpenAiClient {
        OpenAiClient::new(
            base_url,
            "gpt-4o-mini".to_string(),
            Some("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn system_prompt_becomes_first_message() {
        let request = LlmRequest {
            system_prompt: Some("You are the critic.".to_string()),
            messages: vec![ChatMessage::user("Judge this.")],
            temperature: Some(0.2),
            max_tokens: Some(800),
        };

        let json = serde_json::to_value(client(None).build_body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 800);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are the critic.");
        assert_eq!(messages[1]["role"], "user");
    }

    #[test]
    fn configured_sampling_fills_unset_fields() {
        let request = LlmRequest {
            messages: vec![ChatMessage::user("Hello")],
            max_tokens: Some(100),
            ..Default::default()
        };
        let client = client(None).with_sampling(Some(0.3), Some(900));

        let json = serde_json::to_value(client.build_body(&request)).unwrap();

        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn unset_sampling_fields_are_omitted() {
        let request = LlmRequest {
            messages: vec![ChatMessage::user("Hello")],
            ..Default::default()
        };
        let json = serde_json::to_value(client(None).build_body(&request)).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn base_url_defaults_to_openai_and_drops_trailing_slash() {
        assert_eq!(client(None).base_url, "https://api.openai.com");
        assert_eq!(
            client(Some("http://localhost:11434/".into())).base_url,
            "http://localhost:11434"
        );
    }
}
