//! Use-case binding: turns a classification (or an explicit use-case id) into
//! a concrete, validated [`Binding`] ready for orchestration.
//!
//! Binding is the last point where a defective workflow can be rejected;
//! everything the orchestrator receives has already passed DAG validation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::aggregator::BaseScores;
use crate::capability::BASELINE_CAPABILITIES;
use crate::catalog::{ScoreThreshold, UseCaseCatalog, UseCaseDefinition, GENERAL_ANALYSIS};
use crate::classifier::ClassificationResult;
use crate::error::PipelineError;
use crate::workflow::{validate_workflow, Workflow, WorkflowStep};

/// Below this classification confidence the execution timeout budget is
/// stretched.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;
const LOW_CONFIDENCE_TIMEOUT_FACTOR: f64 = 1.5;

/// Read-only context the orchestrator and reporting layers carry along.
#[derive(Serialize, Debug, Clone)]
pub struct BindingContext {
    pub vertical: String,
    pub use_case: String,
    pub regulations: Vec<String>,
    pub thresholds: HashMap<String, ScoreThreshold>,
    pub base_scores: BaseScores,
}

/// The resolved, customized workflow + context for a specific request.
/// Immutable after creation.
#[derive(Serialize, Debug, Clone)]
pub struct Binding {
    pub id: String,
    pub use_case_id: String,
    pub classification: ClassificationResult,
    pub workflow: Workflow,
    pub context: BindingContext,
    /// Whole-execution budget: sum of per-step budgets, confidence-scaled.
    pub timeout_budget_ms: u64,
}

/// Resolves classifications against the catalog.
pub struct UseCaseBinder {
    catalog: Arc<UseCaseCatalog>,
}

impl UseCaseBinder {
    pub fn new(catalog: Arc<UseCaseCatalog>) -> Self {
        UseCaseBinder { catalog }
    }

    /// Resolution order: explicit id > classified use case > inference over
    /// the classified vertical > the generic default.
    pub fn bind(
        &self,
        classification: &ClassificationResult,
        explicit: Option<&str>,
    ) -> Result<Binding, PipelineError> {
        let use_case_id = self.resolve_use_case_id(classification, explicit);
        let definition = self
            .catalog
            .get(&use_case_id)
            .ok_or(PipelineError::UseCaseNotFound(use_case_id))?;

        let workflow = customize_workflow(&definition);
        validate_workflow(&workflow)?;

        let mut timeout_budget_ms = workflow.timeout_budget_ms();
        if classification.confidence < LOW_CONFIDENCE_THRESHOLD {
            timeout_budget_ms =
                (timeout_budget_ms as f64 * LOW_CONFIDENCE_TIMEOUT_FACTOR) as u64;
        }

        Ok(Binding {
            id: Uuid::new_v4().to_string(),
            use_case_id: definition.id.clone(),
            classification: classification.clone(),
            workflow,
            context: BindingContext {
                vertical: definition.vertical.clone(),
                use_case: definition.id.clone(),
                regulations: definition.regulations.clone(),
                thresholds: definition.thresholds.clone(),
                base_scores: definition.base_scores,
            },
            timeout_budget_ms,
        })
    }

    fn resolve_use_case_id(
        &self,
        classification: &ClassificationResult,
        explicit: Option<&str>,
    ) -> String {
        if let Some(id) = explicit {
            return id.to_string();
        }
        if let Some(id) = &classification.use_case {
            return id.clone();
        }

        let vertical = classification.vertical.as_deref().unwrap_or("general");
        let entries = self.catalog.list_by_vertical(vertical);
        match entries.len() {
            0 => GENERAL_ANALYSIS.to_string(),
            1 => entries[0].id.clone(),
            _ => best_overlap(&entries, &classification.keywords)
                .unwrap_or_else(|| entries[0].id.clone()),
        }
    }
}

/// Token overlap between an entry's name + keywords and the classification
/// keywords; strict improvement wins, so catalog order breaks ties.
fn best_overlap(
    entries: &[Arc<UseCaseDefinition>],
    keywords: &[String],
) -> Option<String> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, entry) in entries.iter().enumerate() {
        let name_lower = entry.name.to_lowercase();
        let mut tokens: Vec<&str> = name_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        tokens.extend(entry.keywords.iter().map(|k| k.as_str()));

        let score = keywords
            .iter()
            .filter(|k| tokens.contains(&k.as_str()))
            .count();
        if score > 0 && best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| entries[idx].id.clone())
}

/// One-time customization of a fresh copy; the catalog's base definition is
/// never mutated. Suggested capabilities append as optional steps chained off
/// the previous last step, so dynamic steps serialize after static ones.
fn customize_workflow(definition: &UseCaseDefinition) -> Workflow {
    let mut workflow = definition.base_workflow.clone();
    for capability in &definition.required_capabilities {
        if BASELINE_CAPABILITIES.contains(&capability.as_str()) {
            continue;
        }
        if workflow
            .steps
            .iter()
            .any(|s| &s.capability_id == capability)
        {
            continue;
        }
        let mut step = WorkflowStep::new(format!("dynamic-{capability}"), capability.clone())
            .optional();
        if let Some(last) = workflow.steps.last() {
            step = step.with_dependencies(vec![last.id.clone()]);
        }
        workflow.steps.push(step);
    }
    workflow
}
