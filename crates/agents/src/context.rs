//! Personal context agent: speaks for the user via the interests file.

use std::sync::Arc;

use async_trait::async_trait;
use starter_common::{Agent, AgentCapability, AgentMessage, AgentRole, Result, Task};
use starter_llm::LlmClient;
use starter_tools::InterestsStore;
use tracing::info;

use crate::prompt;
use crate::roles;

pub const EMPTY_INTERESTS: &str = "(The interests file is empty or does not exist yet.)";

pub struct PersonalContextAgent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
    interests: InterestsStore,
}

impl PersonalContextAgent {
    pub fn new(llm: Arc<dyn LlmClient>, interests: InterestsStore) -> Self {
        Self {
            role: roles::personal_context(),
            llm,
            interests,
        }
    }
}

#[async_trait]
impl Agent for PersonalContextAgent {
    fn role(&self) -> &AgentRole {
        &self.role
    }

    async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
        info!(agent = %self.id(), task_id = %task.id, "Processing context task");

        let interests = if self.has_capability(AgentCapability::ReadInterests) {
            self.interests.read_async().await?
        } else {
            String::new()
        };
        let interests = if interests.trim().is_empty() {
            EMPTY_INTERESTS
        } else {
            interests.as_str()
        };

        let prompt = format!(
            "{}\n## Interests file ({})\n{}\n",
            prompt::render_task(task, false),
            self.interests.path().display(),
            interests.trim_end()
        );
        let summary = prompt::ask(self.llm.as_ref(), &self.role, task, prompt).await?;
        Ok(prompt::reply(&self.role, task, summary.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedLlm;
    use starter_common::Target;
    use tempfile::TempDir;

    fn task() -> Task {
        Task::from_spec(&crate::tasks::context_sync(), Target::new("https://example.com/in/x"))
    }

    #[tokio::test]
    async fn reads_interests_into_prompt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("my_interests.md");
        std::fs::write(&path, "- Rust compilers\n- Edge inference\n").unwrap();

        let llm = Arc::new(ScriptedLlm::new(["Focus: compilers."]));
        let agent = PersonalContextAgent::new(llm.clone(), InterestsStore::open(&path));
        let msg = agent.process_task(&task()).await.unwrap();

        assert_eq!(msg.content, "Focus: compilers.");
        assert!(llm.prompts()[0].contains("- Rust compilers\n- Edge inference"));
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(ScriptedLlm::new(["No interests recorded."]));
        let agent =
            PersonalContextAgent::new(llm.clone(), InterestsStore::open(dir.path().join("none.md")));

        agent.process_task(&task()).await.unwrap();
        assert!(llm.prompts()[0].contains(EMPTY_INTERESTS));
    }

    #[tokio::test]
    async fn reading_never_modifies_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("my_interests.md");
        std::fs::write(&path, "- Rust").unwrap();

        let agent = PersonalContextAgent::new(
            Arc::new(ScriptedLlm::new(["ok"])),
            InterestsStore::open(&path),
        );
        agent.process_task(&task()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- Rust");
    }
}
