//! Integration tests for the agents working as a chain.
//!
//! The model is a fake that answers per role, keyed on the system prompt,
//! so the tests never need a hosted LLM or network tools.

use async_trait::async_trait;
use starter_agents::roles;
use starter_agents::tasks;
use starter_agents::{
    Agent, CriticAgent, EvidenceFilterAgent, PersonalContextAgent, ReportWriterAgent,
    ResearchAgent, parse_verdict,
};
use starter_common::{Result, Target, Task};
use starter_llm::{LlmClient, LlmRequest, LlmResponse};
use starter_tools::{
    InterestsStore, PROFILE_NOT_CONFIGURED, ProfileLookup, ToolOutput, WebSearch,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Answers each role with a canned reply and records every prompt.
struct RoleAwareLlm {
    prompts: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl RoleAwareLlm {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn prompt_for(&self, title: &str) -> String {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(system, _)| system.contains(title))
            .map(|(_, user)| user.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for RoleAwareLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = request.system_prompt.clone().unwrap_or_default();
        let user = request
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push((system.clone(), user));

        let content = if system.contains("Web Researcher") {
            "Career vibe: infrastructure builder at Acme."
        } else if system.contains("Personal Context Agent") {
            "Focus: Rust, compilers."
        } else if system.contains("Research Evidence Filter") {
            "Removed:\n- none\n\nCareer vibe: infrastructure builder at Acme."
        } else if system.contains("Review & Critique Agent") {
            "VERDICT: APPROVED\nGrounded and specific."
        } else {
            "## Career Narrative\nBuilder.\n\n## 5 Pointed Questions\n1. a\n\nNEW_INTEREST: Build systems"
        };

        Ok(LlmResponse {
            content: content.to_string(),
            model: "fake".to_string(),
            usage: None,
            finish_reason: None,
        })
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct NoProfile;

#[async_trait]
impl ProfileLookup for NoProfile {
    async fn lookup(&self, _profile_url: &str) -> ToolOutput {
        ToolOutput::NotConfigured(PROFILE_NOT_CONFIGURED)
    }
}

struct OneHit;

#[async_trait]
impl WebSearch for OneHit {
    async fn search(&self, _query: &str) -> ToolOutput {
        ToolOutput::Data("### Acme team\nSource: https://acme.example/team\nJane Doe".to_string())
    }
}

#[tokio::test]
async fn agents_chain_from_research_to_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("my_interests.md");
    std::fs::write(&path, "- Rust\n").unwrap();
    let store = InterestsStore::open(&path);

    let llm = Arc::new(RoleAwareLlm::new());
    let target = Target::new("https://example.com/in/jdoe").with_name(Some("Jane Doe"));

    let researcher = ResearchAgent::new(llm.clone(), Arc::new(NoProfile), Arc::new(OneHit));
    let context = PersonalContextAgent::new(llm.clone(), store.clone());
    let filter = EvidenceFilterAgent::new(llm.clone());
    let critic = CriticAgent::new(llm.clone());
    let writer = ReportWriterAgent::new(llm.clone(), store.clone());

    let research = researcher
        .process_task(&Task::from_spec(&tasks::research(), target.clone()))
        .await
        .unwrap();
    let ctx = context
        .process_task(&Task::from_spec(&tasks::context_sync(), target.clone()))
        .await
        .unwrap();
    let filtered = filter
        .process_task(
            &Task::from_spec(&tasks::evidence_filter(), target.clone())
                .with_upstream(tasks::RESEARCH, research.content.clone()),
        )
        .await
        .unwrap();
    let verdict_msg = critic
        .process_task(
            &Task::from_spec(&tasks::critique(), target.clone())
                .with_upstream(tasks::EVIDENCE_FILTER, filtered.content.clone())
                .with_upstream(tasks::CONTEXT_SYNC, ctx.content.clone()),
        )
        .await
        .unwrap();
    assert!(parse_verdict(&verdict_msg.content).unwrap().is_approved());

    let report = writer
        .process_task(
            &Task::from_spec(&tasks::output(), target.clone())
                .with_upstream(tasks::EVIDENCE_FILTER, filtered.content.clone())
                .with_upstream(tasks::CONTEXT_SYNC, ctx.content.clone())
                .with_upstream(tasks::CRITIQUE, verdict_msg.content.clone()),
        )
        .await
        .unwrap();

    assert_eq!(llm.calls.load(Ordering::SeqCst), 5);
    assert!(research.content.contains(PROFILE_NOT_CONFIGURED));
    assert!(research.content.contains("Source: https://acme.example/team"));
    assert!(llm.prompt_for("Research Evidence Filter").contains(PROFILE_NOT_CONFIGURED));
    assert!(llm.prompt_for("Question Architect").contains("Focus: Rust, compilers."));
    assert!(!report.content.contains("NEW_INTEREST"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "- Rust\nBuild systems\n");
    assert_eq!(report.source_agent.as_deref(), Some(roles::REPORT_WRITER));
}

#[tokio::test]
async fn agent_identity_comes_from_role() {
    let llm = Arc::new(RoleAwareLlm::new());
    let critic = CriticAgent::new(llm);
    assert_eq!(critic.id(), roles::CRITIC);
    assert_eq!(critic.name(), "Review & Critique Agent");
    assert!(critic.role().allow_delegation);
}
