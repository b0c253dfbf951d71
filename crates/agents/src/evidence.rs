//! Evidence filter: drops findings that may be about someone else.

use std::sync::Arc;

use async_trait::async_trait;
use starter_common::{Agent, AgentMessage, AgentRole, Result, Task};
use starter_llm::LlmClient;
use tracing::info;

use crate::prompt;
use crate::roles;

pub struct EvidenceFilterAgent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
}

impl EvidenceFilterAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            role: roles::evidence_filter(),
            llm,
        }
    }
}

#[async_trait]
impl Agent for EvidenceFilterAgent {
    fn role(&self) -> &AgentRole {
        &self.role
    }

    async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
        info!(
            agent = %self.id(),
            task_id = %task.id,
            upstream = task.upstream.len(),
            "Processing evidence filter task"
        );

        // The identity hints are the filter's main criterion, so they are
        // rendered in their strict form.
        let prompt = prompt::render_task(task, true);
        let filtered = prompt::ask(self.llm.as_ref(), &self.role, task, prompt).await?;
        Ok(prompt::reply(&self.role, task, filtered.trim()))
    }
}
