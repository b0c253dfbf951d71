//! Role-specialised agents for the conversation-starter pipeline.
//!
//! - **Web Researcher**: profile lookup + web search, grounded summary
//! - **Personal Context**: the user's interests file, summarized
//! - **Evidence Filter**: drops findings that may concern someone else
//! - **Review & Critique**: approves or rejects with feedback
//! - **Question Architect**: the final report, plus new interests
//!
//! ```text
//! research ─► evidence_filter ─┬─► critique ─┬─► output
//!                context_sync ─┴─────────────┘
//!     ▲                             │
//!     └──────── feedback ◄──────────┘ (rejected)
//! ```
//!
//! The orchestrator role is not a worker; the coordinator holds it.

pub mod context;
pub mod critique;
pub mod evidence;
pub mod prompt;
pub mod report;
pub mod research;
pub mod roles;
pub mod tasks;

#[cfg(test)]
mod mock;

pub use context::PersonalContextAgent;
pub use critique::{CriticAgent, parse_verdict};
pub use evidence::EvidenceFilterAgent;
pub use report::{ReportWriterAgent, split_new_interests};
pub use research::ResearchAgent;
pub use starter_common::{Agent, AgentCapability};
