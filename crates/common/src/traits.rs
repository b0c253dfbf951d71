//! Core agent trait and role configuration.
//!
//! Defined in `starter-common` so that both the coordinator and the agent
//! crate can reference them without circular dependencies.

use crate::{AgentMessage, Result, Task};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tools a role may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCapability {
    /// Structured profile fetch from the profile API
    ProfileLookup,
    /// Web search
    WebSearch,
    /// Read the interests file
    ReadInterests,
    /// Append a line to the interests file
    AppendInterests,
}

/// Which configured model a role runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Default,
    Strong,
}

/// Declarative description of a role. Immutable after construction; the
/// goal and backstory are opaque to the control logic and only ever end up
/// in a system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRole {
    pub id: String,

    /// Human-readable role title, e.g. "Web Researcher"
    pub title: String,

    pub goal: String,

    pub backstory: String,

    /// Whether the role may hand work back to another role.
    #[serde(default)]
    pub allow_delegation: bool,

    #[serde(default)]
    pub capabilities: Vec<AgentCapability>,

    #[serde(default)]
    pub model: ModelTier,
}

impl AgentRole {
    /// System prompt assembled from the role text.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {}.\n\nGoal: {}\n\nBackground: {}",
            self.title, self.goal, self.backstory
        )
    }

    pub fn has_capability(&self, cap: AgentCapability) -> bool {
        self.capabilities.contains(&cap)
    }
}

/// The trait every worker role implements.
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> &str {
        &self.role().id
    }

    fn name(&self) -> &str {
        &self.role().title
    }

    fn role(&self) -> &AgentRole;

    fn capabilities(&self) -> &[AgentCapability] {
        &self.role().capabilities
    }

    fn has_capability(&self, cap: AgentCapability) -> bool {
        self.capabilities().contains(&cap)
    }

    /// Execute one task and return its free-form result.
    async fn process_task(&self, task: &Task) -> Result<AgentMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role() -> AgentRole {
        AgentRole {
            id: "context".into(),
            title: "Personal Context Agent".into(),
            goal: "Represent the user".into(),
            backstory: "You speak for the user.".into(),
            allow_delegation: false,
            capabilities: vec![AgentCapability::ReadInterests],
            model: ModelTier::Default,
        }
    }

    #[test]
    fn system_prompt_contains_role_text() {
        let prompt = role().system_prompt();
        assert!(prompt.starts_with("You are the Personal Context Agent."));
        assert!(prompt.contains("Goal: Represent the user"));
        assert!(prompt.contains("You speak for the user."));
    }

    #[test]
    fn capability_lookup() {
        let role = role();
        assert!(role.has_capability(AgentCapability::ReadInterests));
        assert!(!role.has_capability(AgentCapability::AppendInterests));
    }

    #[test]
    fn role_deserializes_with_defaults() {
        let json = r#"{"id":"x","title":"X","goal":"g","backstory":"b"}"#;
        let role: AgentRole = serde_json::from_str(json).unwrap();
        assert!(!role.allow_delegation);
        assert!(role.capabilities.is_empty());
        assert_eq!(role.model, ModelTier::Default);
    }
}
