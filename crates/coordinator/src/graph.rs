//! Task dependency graph with one designated critique cycle.
//!
//! The graph is a DAG over task specs. The only loop the pipeline runs,
//! research → filter → critique → research, is not an edge in the graph: it
//! is described by [`CritiqueCycle`] and executed by the critique loop at the
//! critique task's position in the order.

use std::collections::{HashMap, HashSet};

use starter_agents::tasks;
use starter_common::{GraphError, TaskSpec};

/// The three tasks that make up the retry cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritiqueCycle {
    pub research: String,
    pub filter: String,
    pub critique: String,
}

impl CritiqueCycle {
    pub fn new(
        research: impl Into<String>,
        filter: impl Into<String>,
        critique: impl Into<String>,
    ) -> Self {
        Self {
            research: research.into(),
            filter: filter.into(),
            critique: critique.into(),
        }
    }

    /// True for the tasks run inside the loop rather than by the scheduler.
    pub fn is_inner(&self, task_id: &str) -> bool {
        task_id == self.research || task_id == self.filter
    }
}

impl Default for CritiqueCycle {
    fn default() -> Self {
        Self::new(tasks::RESEARCH, tasks::EVIDENCE_FILTER, tasks::CRITIQUE)
    }
}

/// Validated task graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<String, TaskSpec>,

    /// task_id -> tasks that depend on it
    reverse_edges: HashMap<String, Vec<String>>,

    /// Declaration order, used to keep the topological order stable.
    insertion_order: Vec<String>,

    execution_order: Vec<String>,

    cycle: CritiqueCycle,
}

impl TaskGraph {
    /// Build and validate. `agents` are the ids of the available workers.
    ///
    /// Fails on duplicate ids, unknown dependencies, unbound agents, cycles
    /// and a malformed critique cycle, in that order.
    pub fn new<I, S>(specs: Vec<TaskSpec>, agents: I, cycle: CritiqueCycle) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: HashSet<String> = agents.into_iter().map(Into::into).collect();

        let mut nodes = HashMap::new();
        let mut reverse_edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut insertion_order = Vec::new();

        for spec in specs {
            if nodes.contains_key(&spec.id) {
                return Err(GraphError::DuplicateTask(spec.id));
            }
            for dep in &spec.dependencies {
                reverse_edges
                    .entry(dep.clone())
                    .or_default()
                    .push(spec.id.clone());
            }
            insertion_order.push(spec.id.clone());
            nodes.insert(spec.id.clone(), spec);
        }

        let mut graph = Self {
            nodes,
            reverse_edges,
            insertion_order,
            execution_order: Vec::new(),
            cycle,
        };

        graph.validate(&agents)?;
        graph.execution_order = graph.topological_order()?;
        Ok(graph)
    }

    /// The standard five-task pipeline.
    pub fn pipeline<I, S>(agents: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tasks::pipeline_tasks(), agents, CritiqueCycle::default())
    }

    pub fn spec(&self, task_id: &str) -> Option<&TaskSpec> {
        self.nodes.get(task_id)
    }

    /// Dependencies before dependents; ties broken by declaration order.
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    pub fn cycle(&self) -> &CritiqueCycle {
        &self.cycle
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn ordered_specs(&self) -> impl Iterator<Item = &TaskSpec> {
        self.insertion_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn validate(&self, agents: &HashSet<String>) -> Result<(), GraphError> {
        for spec in self.ordered_specs() {
            for dep in &spec.dependencies {
                if !self.nodes.contains_key(dep) {
                    return Err(GraphError::MissingDependency {
                        task: spec.id.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        for spec in self.ordered_specs() {
            if !agents.contains(&spec.agent) {
                return Err(GraphError::MissingAgent {
                    task: spec.id.clone(),
                    agent: spec.agent.clone(),
                });
            }
        }

        if let Some(cycle) = self.detect_cycle() {
            return Err(GraphError::Cycle(cycle));
        }

        self.validate_critique_cycle()
    }

    fn validate_critique_cycle(&self) -> Result<(), GraphError> {
        let CritiqueCycle {
            research,
            filter,
            critique,
        } = &self.cycle;

        let spec = |id: &str| {
            self.nodes
                .get(id)
                .ok_or_else(|| GraphError::InvalidCritiqueCycle(format!("task '{id}' is not defined")))
        };
        spec(research)?;
        let filter_spec = spec(filter)?;
        let critique_spec = spec(critique)?;

        if !filter_spec.dependencies.contains(research) {
            return Err(GraphError::InvalidCritiqueCycle(format!(
                "'{filter}' must depend on '{research}'"
            )));
        }
        if !critique_spec.dependencies.contains(filter) {
            return Err(GraphError::InvalidCritiqueCycle(format!(
                "'{critique}' must depend on '{filter}'"
            )));
        }

        // Anything else reading research or filter output must wait for the
        // verdict, otherwise it would see a result the loop may replace.
        for inner in [research, filter] {
            for dependent in self.reverse_edges.get(inner).into_iter().flatten() {
                if dependent == filter || dependent == critique {
                    continue;
                }
                let depends_on_critique = self
                    .nodes
                    .get(dependent)
                    .is_some_and(|s| s.dependencies.contains(critique));
                if !depends_on_critique {
                    return Err(GraphError::InvalidCritiqueCycle(format!(
                        "'{dependent}' reads '{inner}' but does not depend on '{critique}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Kahn's algorithm, ready tasks taken in declaration order.
    fn topological_order(&self) -> Result<Vec<String>, GraphError> {
        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .values()
            .map(|spec| (spec.id.as_str(), spec.dependencies.len()))
            .collect();

        let position = |id: &str| {
            self.insertion_order
                .iter()
                .position(|k| k == id)
                .unwrap_or(usize::MAX)
        };

        let mut ready: Vec<&str> = self
            .insertion_order
            .iter()
            .map(String::as_str)
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while !ready.is_empty() {
            let next = ready.remove(0);
            order.push(next.to_string());

            for dependent in self.reverse_edges.get(next).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(dependent.as_str());
                        ready.sort_by_key(|id| position(id));
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(GraphError::Cycle(
                "unable to complete topological sort".to_string(),
            ));
        }
        Ok(order)
    }

    /// DFS over dependency edges; returns the offending path.
    fn detect_cycle(&self) -> Option<String> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for id in &self.insertion_order {
            if !visited.contains(id.as_str()) && self.dfs_cycle(id, &mut visited, &mut stack) {
                return Some(stack.join(" -> "));
            }
        }
        None
    }

    fn dfs_cycle<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> bool {
        visited.insert(node);
        stack.push(node);

        if let Some(spec) = self.nodes.get(node) {
            for dep in &spec.dependencies {
                if let Some(pos) = stack.iter().position(|x| *x == dep.as_str()) {
                    stack.push(dep.as_str());
                    stack.drain(..pos);
                    return true;
                }
                if !visited.contains(dep.as_str()) && self.dfs_cycle(dep, visited, stack) {
                    return true;
                }
            }
        }

        stack.pop();
        false
    }
}
