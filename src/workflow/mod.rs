//! Workflow data model and bind-time validation.
//!
//! Steps declare dependencies by id and form a DAG. Validation runs during
//! binding, so a defective graph is rejected before any capability is
//! dispatched.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PipelineError;

/// Default per-step timeout budget in milliseconds.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 30_000;

/// One scheduled capability invocation within a workflow.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WorkflowStep {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub capability_id: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub config: Value,
}

impl WorkflowStep {
    /// Create a required step with no dependencies.
    pub fn new(id: impl Into<String>, capability_id: impl Into<String>) -> Self {
        let id = id.into();
        WorkflowStep {
            name: id.clone(),
            id,
            capability_id: capability_id.into(),
            dependencies: Vec::new(),
            optional: false,
            timeout_ms: None,
            config: Value::Null,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Effective timeout budget for this step.
    pub fn timeout_budget_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS)
    }
}

/// An ordered set of steps executed against the capability registry.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Workflow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub steps: Vec<WorkflowStep>,
}

impl Workflow {
    pub fn new(id: impl Into<String>, steps: Vec<WorkflowStep>) -> Self {
        let id = id.into();
        Workflow {
            name: id.clone(),
            id,
            steps,
        }
    }

    /// Sum of per-step timeout budgets; the execution-wide budget before any
    /// binder scaling.
    pub fn timeout_budget_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.timeout_budget_ms()).sum()
    }

    pub fn step(&self, id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// Validate a workflow: unique step ids, known dependency targets, acyclic
/// dependency graph.
pub fn validate_workflow(workflow: &Workflow) -> Result<(), PipelineError> {
    if workflow.steps.is_empty() {
        return Err(PipelineError::EmptyWorkflow(workflow.id.clone()));
    }

    let mut seen = HashSet::new();
    for step in &workflow.steps {
        if !seen.insert(step.id.as_str()) {
            return Err(PipelineError::DuplicateStep(step.id.clone()));
        }
    }

    let mut graph: StableDiGraph<&str, ()> = StableDiGraph::new();
    let mut indices = HashMap::new();
    for step in &workflow.steps {
        let idx = graph.add_node(step.id.as_str());
        indices.insert(step.id.as_str(), idx);
    }

    for step in &workflow.steps {
        for dep in &step.dependencies {
            let Some(&dep_idx) = indices.get(dep.as_str()) else {
                return Err(PipelineError::UnknownDependency {
                    step: step.id.clone(),
                    dependency: dep.clone(),
                });
            };
            graph.add_edge(dep_idx, indices[step.id.as_str()], ());
        }
    }

    if petgraph::algo::is_cyclic_directed(&graph) {
        return Err(PipelineError::CycleDetected(workflow.id.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Workflow {
        Workflow::new(
            "wf",
            vec![
                WorkflowStep::new("a", "cap-a"),
                WorkflowStep::new("b", "cap-b").with_dependencies(vec!["a".into()]),
                WorkflowStep::new("c", "cap-c").with_dependencies(vec!["b".into()]),
            ],
        )
    }

    #[test]
    fn test_validate_chain() {
        assert!(validate_workflow(&chain()).is_ok());
    }

    #[test]
    fn test_detect_cycle() {
        let wf = Workflow::new(
            "wf",
            vec![
                WorkflowStep::new("a", "cap-a").with_dependencies(vec!["b".into()]),
                WorkflowStep::new("b", "cap-b").with_dependencies(vec!["a".into()]),
            ],
        );
        assert!(matches!(
            validate_workflow(&wf),
            Err(PipelineError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let wf = Workflow::new(
            "wf",
            vec![WorkflowStep::new("a", "cap-a").with_dependencies(vec!["a".into()])],
        );
        assert!(matches!(
            validate_workflow(&wf),
            Err(PipelineError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_unknown_dependency() {
        let wf = Workflow::new(
            "wf",
            vec![WorkflowStep::new("a", "cap-a").with_dependencies(vec!["ghost".into()])],
        );
        assert!(matches!(
            validate_workflow(&wf),
            Err(PipelineError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_duplicate_step_id() {
        let wf = Workflow::new(
            "wf",
            vec![
                WorkflowStep::new("a", "cap-a"),
                WorkflowStep::new("a", "cap-b"),
            ],
        );
        assert!(matches!(
            validate_workflow(&wf),
            Err(PipelineError::DuplicateStep(_))
        ));
    }

    #[test]
    fn test_empty_workflow_rejected() {
        let wf = Workflow::new("wf", vec![]);
        assert!(matches!(
            validate_workflow(&wf),
            Err(PipelineError::EmptyWorkflow(_))
        ));
    }

    #[test]
    fn test_timeout_budget_sums_step_budgets() {
        let mut wf = chain();
        wf.steps[0].timeout_ms = Some(5_000);
        assert_eq!(
            wf.timeout_budget_ms(),
            5_000 + 2 * DEFAULT_STEP_TIMEOUT_MS
        );
    }
}
