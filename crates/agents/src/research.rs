//! Web researcher: profile lookup plus web search, then a grounded summary.

use std::sync::Arc;

use async_trait::async_trait;
use starter_common::{Agent, AgentCapability, AgentMessage, AgentRole, Result, Task};
use starter_llm::LlmClient;
use starter_tools::{ProfileLookup, ToolOutput, WebSearch, build_query};
use tracing::{info, warn};

use crate::prompt;
use crate::roles;

pub const PROFILE_SECTION: &str = "## Profile lookup";
pub const SEARCH_SECTION: &str = "## Web search";
pub const SUMMARY_SECTION: &str = "## Research summary";

/// Calls both tools on every attempt and keeps their raw output in the
/// result, so the evidence filter can check each claim against its source.
pub struct ResearchAgent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
    profile: Arc<dyn ProfileLookup>,
    search: Arc<dyn WebSearch>,
}

impl ResearchAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        profile: Arc<dyn ProfileLookup>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self::with_role(roles::researcher(), llm, profile, search)
    }

    pub fn with_role(
        role: AgentRole,
        llm: Arc<dyn LlmClient>,
        profile: Arc<dyn ProfileLookup>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            role,
            llm,
            profile,
            search,
        }
    }

    async fn gather(&self, task: &Task) -> (Option<ToolOutput>, Option<ToolOutput>) {
        let profile = if self.has_capability(AgentCapability::ProfileLookup) {
            Some(self.profile.lookup(&task.target.profile_url).await)
        } else {
            None
        };

        let search = if self.has_capability(AgentCapability::WebSearch) {
            let query = build_query(&task.target);
            Some(self.search.search(&query).await)
        } else {
            None
        };

        for (tool, output) in [("profile_lookup", &profile), ("web_search", &search)] {
            match output {
                Some(ToolOutput::Unavailable(reason)) => {
                    warn!(agent = %self.id(), tool, %reason, "Tool unavailable");
                }
                Some(other) => info!(agent = %self.id(), tool, kind = other.kind(), "Tool returned"),
                None => {}
            }
        }

        (profile, search)
    }
}

fn tool_section(heading: &str, output: Option<&ToolOutput>) -> String {
    let body = output.map(ToolOutput::text).unwrap_or("Not available to this role.");
    format!("{heading}\n{}\n", body.trim_end())
}

#[async_trait]
impl Agent for ResearchAgent {
    fn role(&self) -> &AgentRole {
        &self.role
    }

    async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
        info!(
            agent = %self.id(),
            task_id = %task.id,
            attempt = task.attempt,
            has_feedback = task.feedback.is_some(),
            "Processing research task"
        );

        let (profile, search) = self.gather(task).await;
        let tools = format!(
            "{}\n{}",
            tool_section(PROFILE_SECTION, profile.as_ref()),
            tool_section(SEARCH_SECTION, search.as_ref())
        );

        let prompt = format!(
            "{}\n# Tool results\n\n{tools}",
            prompt::render_task(task, false)
        );
        let summary = prompt::ask(self.llm.as_ref(), &self.role, task, prompt).await?;

        let content = format!("{tools}\n{SUMMARY_SECTION}\n{}\n", summary.trim());
        Ok(prompt::reply(&self.role, task, content))
    }
}
