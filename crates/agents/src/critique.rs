//! Review & critique agent and the verdict contract it answers with.
//!
//! The critic must open with `VERDICT: APPROVED` or `VERDICT: REJECTED`.
//! Markdown emphasis around the marker is tolerated. Everything after the
//! marker is the handoff (approved) or the feedback (rejected).

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use starter_common::{
    Agent, AgentMessage, AgentRole, CritiqueVerdict, Feedback, Result, StarterError, Task,
};
use starter_llm::LlmClient;
use tracing::{info, warn};

use crate::prompt;
use crate::roles;

static VERDICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\s>#*_]*verdict[*_]*\s*[:\-]\s*[*_]*\s*(approved|rejected)\b[*_.]*")
        .expect("verdict pattern is valid")
});

/// Parse critic output into a verdict.
///
/// Without a marker the whole text is treated as rejection feedback, so a
/// malformed answer costs a retry instead of approving unchecked research.
/// A rejection marker with nothing after it is an error.
pub fn parse_verdict(text: &str) -> Result<CritiqueVerdict> {
    if text.trim().is_empty() {
        return Err(StarterError::Critique("critic returned no output".to_string()));
    }

    let Some(caps) = VERDICT_RE.captures(text) else {
        warn!("Critic output has no verdict marker; treating it as a rejection");
        let feedback = Feedback::new(text)
            .ok_or_else(|| StarterError::Critique("critic returned no output".to_string()))?;
        return Ok(CritiqueVerdict::Rejected { feedback });
    };

    let rest = caps
        .get(0)
        .map(|m| &text[m.end()..])
        .unwrap_or_default()
        .trim_start_matches([':', '-', ' ', '\t'])
        .trim();

    if caps[1].eq_ignore_ascii_case("approved") {
        return Ok(CritiqueVerdict::Approved {
            handoff: rest.to_string(),
        });
    }

    Feedback::new(rest)
        .map(|feedback| CritiqueVerdict::Rejected { feedback })
        .ok_or_else(|| {
            StarterError::Critique("rejection carries no feedback for the researcher".to_string())
        })
}

pub struct CriticAgent {
    role: AgentRole,
    llm: Arc<dyn LlmClient>,
}

impl CriticAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            role: roles::critic(),
            llm,
        }
    }
}

#[async_trait]
impl Agent for CriticAgent {
    fn role(&self) -> &AgentRole {
        &self.role
    }

    /// Returns the critic's raw answer. Parsing is left to the caller so the
    /// loop can record exactly what the critic said.
    async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
        info!(
            agent = %self.id(),
            task_id = %task.id,
            attempt = task.attempt,
            "Processing critique task"
        );

        let prompt = prompt::render_task(task, false);
        let answer = prompt::ask(self.llm.as_ref(), &self.role, task, prompt).await?;
        Ok(prompt::reply(&self.role, task, answer.trim()))
    }
}
