//! Task definitions and task executions.
//!
//! A [`TaskSpec`] is the declarative half: instruction text, output contract,
//! upstream dependencies and the agent it is bound to. A [`Task`] is one
//! execution of a spec, carrying the upstream results it is allowed to read.

use serde::{Deserialize, Serialize};

use crate::message::now_millis;
use crate::target::Target;
use crate::verdict::Feedback;

/// Declarative description of one pipeline task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,

    /// Natural-language instruction for the assigned role.
    pub description: String,

    /// Expected-output contract. Free text, never machine-checked.
    pub expected_output: String,

    /// Upstream tasks whose results this task consumes.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Agent id the task is bound to.
    pub agent: String,
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            expected_output: String::new(),
            dependencies: Vec::new(),
            agent: agent.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    pub fn depends_on(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }
}

/// Execution state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Result of an upstream task handed to a dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamResult {
    pub task_id: String,
    pub content: String,
}

/// One execution of a [`TaskSpec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique per execution, e.g. `research#2`.
    pub id: String,

    pub spec_id: String,

    pub description: String,

    pub expected_output: String,

    pub target: Target,

    /// Results of the declared dependencies, in declaration order.
    #[serde(default)]
    pub upstream: Vec<UpstreamResult>,

    /// Rejection feedback from the previous critique, attached verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,

    /// 1-based attempt number of this spec within the run.
    pub attempt: u32,

    pub status: TaskStatus,

    pub created_at: u64,
}

impl Task {
    pub fn from_spec(spec: &TaskSpec, target: Target) -> Self {
        Self {
            id: format!("{}#1", spec.id),
            spec_id: spec.id.clone(),
            description: spec.description.clone(),
            expected_output: spec.expected_output.clone(),
            target,
            upstream: Vec::new(),
            feedback: None,
            attempt: 1,
            status: TaskStatus::Pending,
            created_at: now_millis(),
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self.id = format!("{}#{}", self.spec_id, attempt);
        self
    }

    pub fn with_upstream(mut self, task_id: impl Into<String>, content: impl Into<String>) -> Self {
        self.upstream.push(UpstreamResult {
            task_id: task_id.into(),
            content: content.into(),
        });
        self
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Result of the named upstream task, if it was handed to this task.
    pub fn upstream_for(&self, task_id: &str) -> Option<&str> {
        self.upstream
            .iter()
            .find(|u| u.task_id == task_id)
            .map(|u| u.content.as_str())
    }
}
