//! Role definitions for the six pipeline agents.
//!
//! The text here is opaque to the control logic; it only ends up in system
//! prompts. Capability and delegation flags are what the coordinator reads.

use starter_common::{AgentCapability, AgentRole, ModelTier};

pub const ORCHESTRATOR: &str = "orchestrator";
pub const RESEARCHER: &str = "web_researcher";
pub const PERSONAL_CONTEXT: &str = "personal_context";
pub const EVIDENCE_FILTER: &str = "evidence_filter";
pub const CRITIC: &str = "review_critique";
pub const REPORT_WRITER: &str = "question_architect";

fn role(
    id: &str,
    title: &str,
    goal: &str,
    backstory: &str,
    allow_delegation: bool,
    capabilities: &[AgentCapability],
    model: ModelTier,
) -> AgentRole {
    AgentRole {
        id: id.to_string(),
        title: title.to_string(),
        goal: goal.to_string(),
        backstory: backstory.to_string(),
        allow_delegation,
        capabilities: capabilities.to_vec(),
        model,
    }
}

/// The manager. Held by the coordinator, never in the worker roster.
pub fn orchestrator() -> AgentRole {
    role(
        ORCHESTRATOR,
        "Orchestrator",
        "Oversee the crew, delegate tasks to the right agents, and ensure the research and \
         output pipeline completes to a high standard.",
        "You are an experienced coordinator who runs research and synthesis workflows. You \
         assign work to the Web Researcher, Personal Context Agent, Research Evidence Filter, \
         Review & Critique Agent and Question Architect. When the critic rejects research you \
         send it back to the Web Researcher together with the critic's feedback, word for word.",
        true,
        &[],
        ModelTier::Default,
    )
}

pub fn researcher() -> AgentRole {
    role(
        RESEARCHER,
        "Web Researcher",
        "Gather deep intelligence on the target person: career vibe, key achievements, and \
         non-obvious interests. Use the profile lookup when available; otherwise use web \
         search only.",
        "You are a thorough researcher. Profile data, when present, is the source of truth for \
         titles, companies and dates. Web search adds talks, articles and side projects that \
         clearly refer to this person. You only report facts that appear in tool results and \
         prefer saying 'not found' over guessing.",
        false,
        &[AgentCapability::ProfileLookup, AgentCapability::WebSearch],
        ModelTier::Strong,
    )
}

pub fn personal_context() -> AgentRole {
    role(
        PERSONAL_CONTEXT,
        "Personal Context Agent",
        "Represent the user by providing their current focus areas, interests, and expertise \
         from the interests file.",
        "You speak for the user. Your summary is used to personalize the research critique and \
         to bridge the other person's background with the user's current state.",
        false,
        &[AgentCapability::ReadInterests],
        ModelTier::Default,
    )
}

pub fn evidence_filter() -> AgentRole {
    role(
        EVIDENCE_FILTER,
        "Research Evidence Filter",
        "Keep only research findings that have concrete evidence they refer to the target \
         person, and say what was removed and why.",
        "You are a skeptical fact checker. Many people share a name. A claim survives only if \
         its source uniquely identifies the target: the profile itself, or a page that names \
         them together with their company or role. When in doubt you exclude the claim. You \
         never add information.",
        false,
        &[],
        ModelTier::Default,
    )
}

pub fn critic() -> AgentRole {
    role(
        CRITIC,
        "Review & Critique Agent",
        "Validate that the filtered research is deep enough, grounded, and has concrete hooks \
         tied to the user's interests. If not, send precise instructions back to the researcher.",
        "You are a quality reviewer. You compare the filtered research against the personal \
         context, reject generic summaries and unsupported details, and insist on specific, \
         interest-aligned hooks.",
        true,
        &[],
        ModelTier::Default,
    )
}

pub fn report_writer() -> AgentRole {
    role(
        REPORT_WRITER,
        "Question Architect",
        "Produce a Markdown report with a career recap, 5 Pointed Questions and 3 Conversation \
         Starters that bridge the person's background with the user's current state.",
        "You turn research and context into actionable networking content. You write clear, \
         specific questions and starters, identify what the user could learn from the person, \
         and record genuinely new interests for the user.",
        false,
        &[AgentCapability::AppendInterests],
        ModelTier::Strong,
    )
}

/// The five worker roles, in pipeline order.
pub fn worker_roles() -> Vec<AgentRole> {
    vec![
        researcher(),
        personal_context(),
        evidence_filter(),
        critic(),
        report_writer(),
    ]
}
