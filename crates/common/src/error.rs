//! Error types for the conversation-starter pipeline.

use thiserror::Error;

/// Problems found while building a task graph. All of these are raised
/// before any task executes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate task id '{0}'")]
    DuplicateTask(String),

    #[error("task '{task}' depends on unknown task '{missing}'")]
    MissingDependency { task: String, missing: String },

    #[error("task '{task}' is bound to unknown agent '{agent}'")]
    MissingAgent { task: String, agent: String },

    #[error("dependency cycle: {0}")]
    Cycle(String),

    #[error("invalid critique cycle: {0}")]
    InvalidCritiqueCycle(String),
}

#[derive(Error, Debug)]
pub enum StarterError {
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Critique error: {0}")]
    Critique(String),

    #[error("Task graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StarterError>;
