//! Messages produced by agents while executing pipeline tasks.

use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Free-form text output of one agent, tagged with its origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Unique message ID
    pub id: String,

    pub role: MessageRole,

    pub content: String,

    /// Agent that produced the message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_agent: Option<String>,

    /// Task the message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Unix millis
    pub timestamp: u64,
}

impl AgentMessage {
    fn build(role: MessageRole, source_agent: Option<String>, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            source_agent,
            task_id: None,
            timestamp: now_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::build(MessageRole::User, None, content.into())
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::build(MessageRole::System, None, content.into())
    }

    pub fn from_agent(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, Some(agent.into()), content.into())
    }

    /// Tag the message with the task it answers.
    pub fn for_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }
}

pub(crate) fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
