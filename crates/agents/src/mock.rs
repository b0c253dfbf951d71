//! In-process stand-ins for the model and the HTTP tools.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use starter_common::Result;
use starter_llm::{LlmClient, LlmRequest, LlmResponse};
use starter_tools::{
    PROFILE_NOT_CONFIGURED, ProfileLookup, SEARCH_NOT_CONFIGURED, ToolOutput, WebSearch,
};

/// Answers with the scripted replies in order, repeating the last one.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            last: Mutex::new(String::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(LlmResponse {
            content: last.clone(),
            model: "scripted".to_string(),
            usage: None,
            finish_reason: Some("stop".to_string()),
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub struct FixedProfile(ToolOutput);

impl FixedProfile {
    pub fn data(text: &str) -> Self {
        Self(ToolOutput::Data(text.to_string()))
    }

    pub fn not_configured() -> Self {
        Self(ToolOutput::NotConfigured(PROFILE_NOT_CONFIGURED))
    }
}

#[async_trait]
impl ProfileLookup for FixedProfile {
    async fn lookup(&self, _profile_url: &str) -> ToolOutput {
        self.0.clone()
    }
}

pub struct FixedSearch {
    output: ToolOutput,
    queries: Mutex<Vec<String>>,
}

impl FixedSearch {
    fn with(output: ToolOutput) -> Self {
        Self {
            output,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn data(text: &str) -> Self {
        Self::with(ToolOutput::Data(text.to_string()))
    }

    pub fn not_configured() -> Self {
        Self::with(ToolOutput::NotConfigured(SEARCH_NOT_CONFIGURED))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for FixedSearch {
    async fn search(&self, query: &str) -> ToolOutput {
        self.queries.lock().unwrap().push(query.to_string());
        self.output.clone()
    }
}
