//! Common types and traits shared across the conversation-starter crates.
//!
//! The pipeline is a handful of role-specialised agents exchanging free-form
//! text. This crate holds the pieces every other crate agrees on: the error
//! type, task specs and executions, the agent trait, and critique verdicts.

pub mod error;
pub mod message;
pub mod target;
pub mod task;
pub mod traits;
pub mod verdict;

pub use error::{GraphError, Result, StarterError};
pub use message::{AgentMessage, MessageRole};
pub use target::Target;
pub use task::{Task, TaskSpec, TaskStatus, UpstreamResult};
pub use traits::{Agent, AgentCapability, AgentRole, ModelTier};
pub use verdict::{CritiqueVerdict, Feedback};
