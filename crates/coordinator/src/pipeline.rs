//! The delegating coordinator.
//!
//! Runs the task graph in topological order. Research and filter are not
//! scheduled on their own: when the order reaches the critique task, the
//! critique loop runs all three, and the surviving results are published
//! to later tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use starter_agents::{
    CriticAgent, EvidenceFilterAgent, PersonalContextAgent, ReportWriterAgent, ResearchAgent,
    parse_verdict, roles,
};
use starter_common::{Agent, AgentRole, Feedback, Result, StarterError, Target, Task, TaskSpec};
use starter_llm::build_llm_client_shared;
use starter_tools::{InterestsStore, ProfileLookupClient, WebSearchClient};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::critique::{Critique, CritiqueLoop, CritiqueState, CritiqueStatus, CycleSteps};
use crate::graph::{CritiqueCycle, TaskGraph};

/// Input of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub target: Target,
}

impl PipelineRequest {
    pub fn new(target: Target) -> Self {
        Self { target }
    }
}

/// One task execution as it happened.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    /// Execution id, e.g. `research#2`.
    pub task_id: String,
    pub spec_id: String,
    pub agent: String,
    pub attempt: u32,
    pub content: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Result of the last task in execution order.
    pub report: String,
    /// Latest result per task spec.
    pub results: HashMap<String, String>,
    /// Every execution, in order, retries included.
    pub executions: Vec<TaskRecord>,
    pub critique: CritiqueStatus,
    pub research_attempts: u32,
    pub feedback: Vec<Feedback>,
    pub transitions: Vec<CritiqueState>,
    pub duration: Duration,
}

impl PipelineOutcome {
    pub fn is_exhausted(&self) -> bool {
        self.critique == CritiqueStatus::Exhausted
    }
}

pub struct Coordinator {
    manager: AgentRole,
    graph: TaskGraph,
    agents: HashMap<String, Arc<dyn Agent>>,
    max_iterations: u32,
}

impl Coordinator {
    /// Validate the graph against the roster. Nothing external is called
    /// here, so a bad graph fails before any model or tool request.
    pub fn new(
        specs: Vec<TaskSpec>,
        agents: Vec<Arc<dyn Agent>>,
        cycle: CritiqueCycle,
        max_iterations: u32,
    ) -> Result<Self> {
        let agents: HashMap<String, Arc<dyn Agent>> = agents
            .into_iter()
            .map(|agent| (agent.id().to_string(), agent))
            .collect();
        let graph = TaskGraph::new(specs, agents.keys().cloned(), cycle)?;

        info!(
            tasks = graph.len(),
            agents = agents.len(),
            max_iterations,
            order = ?graph.execution_order(),
            "Coordinator ready"
        );

        Ok(Self {
            manager: roles::orchestrator(),
            graph,
            agents,
            max_iterations,
        })
    }

    /// The standard five-task pipeline over the given workers.
    pub fn standard(agents: Vec<Arc<dyn Agent>>, max_iterations: u32) -> Result<Self> {
        Self::new(
            starter_agents::tasks::pipeline_tasks(),
            agents,
            CritiqueCycle::default(),
            max_iterations,
        )
    }

    /// Build clients and agents from resolved configuration.
    ///
    /// All model clients share one concurrency budget. Call
    /// [`PipelineConfig::resolve_credentials`] first.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            config.llm.max_concurrent_requests.max(1),
        ));
        let llm = build_llm_client_shared(&config.llm, semaphore.clone())?;
        let strong = build_llm_client_shared(&config.strong_llm(), semaphore)?;

        let profile = Arc::new(ProfileLookupClient::new(config.profile.clone())?);
        let search = Arc::new(WebSearchClient::new(config.search.clone())?);
        let interests = InterestsStore::open(&config.pipeline.interests_path);

        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(ResearchAgent::new(strong.clone(), profile, search)),
            Arc::new(PersonalContextAgent::new(llm.clone(), interests.clone())),
            Arc::new(EvidenceFilterAgent::new(llm.clone())),
            Arc::new(CriticAgent::new(llm)),
            Arc::new(ReportWriterAgent::new(strong, interests)),
        ];

        Self::standard(agents, config.pipeline.max_iterations)
    }

    pub fn manager(&self) -> &AgentRole {
        &self.manager
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineOutcome> {
        let started = Instant::now();
        let target = request.target;
        info!(
            manager = %self.manager.id,
            profile_url = %target.profile_url,
            name = ?target.name,
            current_work = ?target.current_work,
            "Pipeline run started"
        );

        let cycle = self.graph.cycle().clone();
        let mut results: HashMap<String, String> = HashMap::new();
        let mut executions = Vec::new();
        let mut cycle_outcome = None;

        for task_id in self.graph.execution_order() {
            if cycle.is_inner(task_id) {
                continue;
            }

            if *task_id == cycle.critique {
                let mut steps = PipelineCycle {
                    coordinator: self,
                    cycle: &cycle,
                    target: &target,
                    done: &results,
                    research: String::new(),
                    executions: Vec::new(),
                };
                let outcome = CritiqueLoop::new(self.max_iterations)
                    .run(&mut steps)
                    .await?;
                executions.append(&mut steps.executions);

                results.insert(cycle.research.clone(), outcome.research.clone());
                results.insert(cycle.filter.clone(), outcome.filtered.clone());
                results.insert(cycle.critique.clone(), outcome.critique.clone());
                cycle_outcome = Some(outcome);
                continue;
            }

            let spec = self.spec(task_id)?;
            let task = self.build_task(spec, &target, 1, |dep| results.get(dep).map(String::as_str))?;
            let record = self.execute(spec, &task).await?;
            results.insert(spec.id.clone(), record.content.clone());
            executions.push(record);
        }

        let outcome = cycle_outcome.ok_or_else(|| {
            StarterError::Agent(format!("critique task '{}' never ran", cycle.critique))
        })?;

        let last = self
            .graph
            .execution_order()
            .last()
            .ok_or_else(|| StarterError::Agent("task graph is empty".to_string()))?;
        let report = results.get(last).cloned().unwrap_or_default();

        let duration = started.elapsed();
        info!(
            critique = ?outcome.status,
            research_attempts = outcome.attempts,
            executions = executions.len(),
            duration_ms = duration.as_millis() as u64,
            "Pipeline run finished"
        );

        Ok(PipelineOutcome {
            report,
            results,
            executions,
            critique: outcome.status,
            research_attempts: outcome.attempts,
            feedback: outcome.feedback,
            transitions: outcome.transitions,
            duration,
        })
    }

    fn spec(&self, task_id: &str) -> Result<&TaskSpec> {
        self.graph
            .spec(task_id)
            .ok_or_else(|| StarterError::Agent(format!("unknown task '{task_id}'")))
    }

    /// A task sees exactly the results of its declared dependencies.
    fn build_task<'a>(
        &self,
        spec: &TaskSpec,
        target: &Target,
        attempt: u32,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<Task> {
        let mut task = Task::from_spec(spec, target.clone()).with_attempt(attempt);
        for dep in &spec.dependencies {
            let content = lookup(dep).ok_or_else(|| {
                StarterError::Agent(format!(
                    "task '{}' started before its dependency '{dep}'",
                    spec.id
                ))
            })?;
            task = task.with_upstream(dep.clone(), content);
        }
        Ok(task)
    }

    async fn execute(&self, spec: &TaskSpec, task: &Task) -> Result<TaskRecord> {
        let agent = self.agents.get(&spec.agent).ok_or_else(|| {
            StarterError::Agent(format!("no agent '{}' for task '{}'", spec.agent, spec.id))
        })?;

        info!(
            task = %task.id,
            agent = %agent.id(),
            attempt = task.attempt,
            upstream = task.upstream.len(),
            "Task started"
        );
        let started = Instant::now();
        let message = agent.process_task(task).await?;
        let elapsed = started.elapsed();
        info!(
            task = %task.id,
            agent = %agent.id(),
            elapsed_ms = elapsed.as_millis() as u64,
            result_len = message.content.len(),
            "Task completed"
        );

        Ok(TaskRecord {
            task_id: task.id.clone(),
            spec_id: spec.id.clone(),
            agent: agent.id().to_string(),
            attempt: task.attempt,
            content: message.content,
            elapsed,
        })
    }
}

/// Drives the cycle's three tasks through the real agents.
struct PipelineCycle<'a> {
    coordinator: &'a Coordinator,
    cycle: &'a CritiqueCycle,
    target: &'a Target,
    /// Results of tasks finished before the loop.
    done: &'a HashMap<String, String>,
    research: String,
    executions: Vec<TaskRecord>,
}

impl PipelineCycle<'_> {
    async fn run_step(
        &mut self,
        spec_id: &str,
        attempt: u32,
        inner: &[(&str, &str)],
        feedback: Option<&Feedback>,
    ) -> Result<String> {
        let spec = self.coordinator.spec(spec_id)?;
        let done = self.done;
        let mut task = self.coordinator.build_task(spec, self.target, attempt, |dep| {
            inner
                .iter()
                .find(|(id, _)| *id == dep)
                .map(|(_, content)| *content)
                .or_else(|| done.get(dep).map(String::as_str))
        })?;
        if let Some(feedback) = feedback {
            debug!(task = %task.id, "Attaching critique feedback");
            task = task.with_feedback(feedback.clone());
        }

        let record = self.coordinator.execute(spec, &task).await?;
        let content = record.content.clone();
        self.executions.push(record);
        Ok(content)
    }
}

#[async_trait]
impl CycleSteps for PipelineCycle<'_> {
    async fn research(&mut self, attempt: u32, feedback: Option<&Feedback>) -> Result<String> {
        let id = self.cycle.research.clone();
        let research = self.run_step(&id, attempt, &[], feedback).await?;
        self.research = research.clone();
        Ok(research)
    }

    async fn filter(&mut self, attempt: u32, research: &str) -> Result<String> {
        let (id, research_id) = (self.cycle.filter.clone(), self.cycle.research.clone());
        self.run_step(&id, attempt, &[(research_id.as_str(), research)], None)
            .await
    }

    async fn critique(&mut self, attempt: u32, filtered: &str) -> Result<Critique> {
        let id = self.cycle.critique.clone();
        let (research_id, filter_id) = (self.cycle.research.clone(), self.cycle.filter.clone());
        let research = self.research.clone();
        let inner = [
            (research_id.as_str(), research.as_str()),
            (filter_id.as_str(), filtered),
        ];
        let text = self.run_step(&id, attempt, &inner, None).await?;
        let verdict = parse_verdict(&text)?;
        info!(
            task = %id,
            attempt,
            approved = verdict.is_approved(),
            "Critique verdict"
        );
        Ok(Critique { text, verdict })
    }
}
