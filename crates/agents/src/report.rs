//! Question architect: the final Markdown report.
//!
//! New interests are announced with `NEW_INTEREST: <text>` lines. The agent
//! appends each one to the interests file and strips them from the report.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use starter_common::{Agent, AgentCapability, AgentMessage, AgentRole, Result, Task};
use starter_llm::LlmClient;
use starter_tools::InterestsStore;
use tracing::{info, warn};

use crate::prompt;
use crate::roles;

static NEW_INTEREST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*]\s*)?[*_`]*NEW_INTEREST[*_`]*\s*:[*_`]*\s*(.*?)\s*$")
        .expect("interest pattern is valid")
});

/// Report body with interest lines removed, plus the extracted interests in
/// order of appearance.
pub fn split_new_interests(text: &str) -> (String, Vec<String>) {
    let mut kept = Vec::new();
    let mut interests = Vec::new();

    for line in text.lines() {
        match NEW_INTEREST_RE.captures(line) {
            Some(caps) => {
                let interest = caps[1].trim_end_matches(['*', '_', '`']).trim();
                if !interest.is_empty() {
                    interests.push(interest.to_string());
                }
            }
            None => kept.push(line),
        }
    }

    (kept.join("\n").trim().to_string(), interests)
}

pub struct ReportWriterAgent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
    interests: InterestsStore,
}

impl ReportWriterAgent {
    pub fn new(llm: Arc<dyn LlmClient>, interests: InterestsStore) -> Self {
        Self {
            role: roles::report_writer(),
            llm,
            interests,
        }
    }

    async fn record(&self, new_interests: &[String]) -> usize {
        if !self.has_capability(AgentCapability::AppendInterests) {
            return 0;
        }
        let mut written = 0;
        for interest in new_interests {
            match self.interests.append_async(interest.as_str()).await {
                Ok(()) => written += 1,
                Err(e) => warn!(agent = %self.id(), %interest, error = %e, "Could not record interest"),
            }
        }
        written
    }
}

#[async_trait]
impl Agent for ReportWriterAgent {
    fn role(&self) -> &AgentRole {
        &self.role
    }

    async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
        info!(agent = %self.id(), task_id = %task.id, "Processing report task");

        let prompt = prompt::render_task(task, false);
        let answer = prompt::ask(self.llm.as_ref(), &self.role, task, prompt).await?;

        let (report, new_interests) = split_new_interests(&answer);
        let written = self.record(&new_interests).await;
        info!(
            agent = %self.id(),
            found = new_interests.len(),
            written,
            "Recorded new interests"
        );

        Ok(prompt::reply(&self.role, task, report))
    }
}
