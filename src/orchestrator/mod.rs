//! The scheduler core: executes a binding's steps against the capability
//! registry, honoring dependency order, per-step timeouts, the execution-wide
//! budget, and cooperative cancellation.
//!
//! Individual step failures never escape as errors; they are folded into the
//! [`OrchestrationResult`]. Only setup failures and cancellation observed
//! before the run starts are returned as `Err`.

mod cancel;
mod state;

pub use cancel::{CancelSignal, CancellationRegistry};
pub use state::{ExecutionState, ExecutionStatus, OrchestrationResult, StepFailure, StepStatus};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use uuid::Uuid;

use crate::aggregator::aggregate;
use crate::audit::{AuditEvent, AuditSink, NoopAuditSink};
use crate::binder::Binding;
use crate::capability::{
    AnalysisRequest, CapabilityRegistry, CapabilityResult, BASELINE_CAPABILITIES,
};
use crate::error::{PipelineError, StepError};
use crate::workflow::WorkflowStep;

/// Step ids synthesized for the mandatory baseline tier, one per dimension.
pub const BASELINE_STEP_IDS: &[&str] =
    &["baseline-security", "baseline-integrity", "baseline-accuracy"];

type StepOutcome = (String, Result<CapabilityResult, StepError>);

/// Drives one binding at a time; holds no per-execution state itself, so a
/// single orchestrator serves concurrent executions.
pub struct WorkflowOrchestrator {
    registry: Arc<CapabilityRegistry>,
    audit: Arc<dyn AuditSink>,
}

impl WorkflowOrchestrator {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        WorkflowOrchestrator {
            registry,
            audit: Arc::new(NoopAuditSink),
        }
    }

    pub fn with_audit_sink(registry: Arc<CapabilityRegistry>, audit: Arc<dyn AuditSink>) -> Self {
        WorkflowOrchestrator { registry, audit }
    }

    /// Execute with a private cancellation signal.
    pub async fn execute(
        &self,
        binding: &Binding,
        request: &AnalysisRequest,
    ) -> Result<OrchestrationResult, PipelineError> {
        self.execute_with_signal(binding, request, CancelSignal::new())
            .await
    }

    /// Execute, observing an externally held cancellation signal.
    pub async fn execute_with_signal(
        &self,
        binding: &Binding,
        request: &AnalysisRequest,
        cancel: CancelSignal,
    ) -> Result<OrchestrationResult, PipelineError> {
        self.execute_prepared(Uuid::new_v4().to_string(), binding, request, cancel)
            .await
    }

    /// Execute under a caller-assigned execution id, so the id can be
    /// registered with a [`CancellationRegistry`] before the run starts.
    ///
    /// A signal already triggered on entry is a setup failure; any later
    /// trigger produces a structured result with status `Cancelled`.
    pub async fn execute_prepared(
        &self,
        execution_id: String,
        binding: &Binding,
        request: &AnalysisRequest,
        cancel: CancelSignal,
    ) -> Result<OrchestrationResult, PipelineError> {
        if cancel.is_triggered() {
            return Err(PipelineError::Cancelled);
        }

        let started = Instant::now();

        let baseline: Vec<WorkflowStep> = BASELINE_STEP_IDS
            .iter()
            .zip(BASELINE_CAPABILITIES)
            .map(|(id, capability)| WorkflowStep::new(*id, *capability))
            .collect();

        let order: Vec<String> = baseline
            .iter()
            .chain(binding.workflow.steps.iter())
            .map(|s| s.id.clone())
            .collect();
        let mut state = ExecutionState::new(execution_id.clone(), order);
        let mut results: HashMap<String, CapabilityResult> = HashMap::new();
        let mut errors: Vec<StepFailure> = Vec::new();
        let mut cancelled = false;
        let mut halted = false;

        // Baseline tier: fixed order, each step required, independent of the
        // per-use-case DAG.
        for step in &baseline {
            if cancel.is_triggered() {
                cancelled = true;
                break;
            }
            state.mark(&step.id, StepStatus::Running);
            let outcome = self.run_step(step, request, &cancel).await;
            let was_cancelled = matches!(outcome, Err(StepError::Cancelled));
            let status = self
                .settle(&mut state, &mut results, &mut errors, step, outcome)
                .await;
            if was_cancelled {
                cancelled = true;
                break;
            }
            if !status.is_success() {
                halted = true;
                break;
            }
        }

        if !cancelled && !halted {
            let steps_by_id: HashMap<&str, &WorkflowStep> = binding
                .workflow
                .steps
                .iter()
                .map(|s| (s.id.as_str(), s))
                .collect();
            let mut in_flight: FuturesUnordered<BoxFuture<'_, StepOutcome>> =
                FuturesUnordered::new();

            loop {
                if cancel.is_triggered() {
                    cancelled = true;
                }
                if !cancelled
                    && !halted
                    && started.elapsed().as_millis() as u64 > binding.timeout_budget_ms
                {
                    errors.push(StepFailure::now(
                        binding.workflow.id.clone(),
                        format!(
                            "execution timeout budget of {}ms exhausted",
                            binding.timeout_budget_ms
                        ),
                    ));
                    halted = true;
                }

                if !cancelled && !halted {
                    propagate_skips(&mut state, &binding.workflow.steps);
                    for step in &binding.workflow.steps {
                        if state.status(&step.id) != StepStatus::Pending {
                            continue;
                        }
                        let gated = step
                            .dependencies
                            .iter()
                            .all(|dep| state.status(dep).is_success());
                        if !gated {
                            continue;
                        }
                        state.mark(&step.id, StepStatus::Running);
                        let cancel_for_step = cancel.clone();
                        in_flight.push(Box::pin(async move {
                            let outcome =
                                self.run_step(step, request, &cancel_for_step).await;
                            (step.id.clone(), outcome)
                        }));
                    }
                }

                let Some((step_id, outcome)) = in_flight.next().await else {
                    break;
                };
                let step = steps_by_id[step_id.as_str()];
                let was_cancelled = matches!(outcome, Err(StepError::Cancelled));
                let status = self
                    .settle(&mut state, &mut results, &mut errors, step, outcome)
                    .await;
                if was_cancelled {
                    cancelled = true;
                } else if !status.is_success() && !step.optional {
                    halted = true;
                }
            }
        }

        // Cancellation leaves never-started steps pending; a halt skips them.
        if halted && !cancelled {
            state.skip_pending();
        }

        let status = if cancelled {
            ExecutionStatus::Cancelled
        } else if halted {
            ExecutionStatus::Failed
        } else if errors.is_empty() {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Partial
        };

        let ordered: Vec<&CapabilityResult> = state
            .order()
            .iter()
            .filter_map(|id| results.get(id))
            .collect();
        let scores = aggregate(&binding.context.base_scores, ordered);

        Ok(OrchestrationResult {
            execution_id,
            use_case_id: binding.use_case_id.clone(),
            status,
            results,
            step_status: state.into_status_map(),
            scores,
            duration_ms: started.elapsed().as_millis() as u64,
            errors,
        })
    }

    /// The three-way race: capability response vs. per-step timeout vs.
    /// cancellation. First to resolve wins.
    async fn run_step(
        &self,
        step: &WorkflowStep,
        request: &AnalysisRequest,
        cancel: &CancelSignal,
    ) -> Result<CapabilityResult, StepError> {
        let Some(capability) = self.registry.get(&step.capability_id) else {
            return Err(StepError::CapabilityNotFound(step.capability_id.clone()));
        };
        if !self.registry.is_enabled(&step.capability_id) {
            return Err(StepError::CapabilityDisabled(step.capability_id.clone()));
        }

        let budget = step.timeout_budget_ms();
        tokio::select! {
            result = capability.invoke(request, &step.config) => result,
            _ = tokio::time::sleep(Duration::from_millis(budget)) => {
                Err(StepError::Timeout { ms: budget })
            }
            _ = cancel.cancelled() => Err(StepError::Cancelled),
        }
    }

    /// Record a step outcome: status transition, result/error bookkeeping,
    /// best-effort audit.
    async fn settle(
        &self,
        state: &mut ExecutionState,
        results: &mut HashMap<String, CapabilityResult>,
        errors: &mut Vec<StepFailure>,
        step: &WorkflowStep,
        outcome: Result<CapabilityResult, StepError>,
    ) -> StepStatus {
        let status = match &outcome {
            Ok(_) => StepStatus::Done,
            Err(e) if e.is_timeout() => StepStatus::TimedOut,
            Err(_) => StepStatus::Failed,
        };
        state.mark(&step.id, status);

        let error_message = outcome.as_ref().err().map(|e| e.to_string());
        if let Ok(result) = outcome {
            results.insert(step.id.clone(), result);
        }
        if let Some(message) = &error_message {
            errors.push(StepFailure::now(step.id.clone(), message.clone()));
        }

        let event = AuditEvent {
            execution_id: state.execution_id.clone(),
            step_id: step.id.clone(),
            capability_id: step.capability_id.clone(),
            status,
            error: error_message,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.audit.record(event).await {
            tracing::warn!(step_id = %step.id, error = %e, "audit record dropped");
        }

        status
    }
}

/// Mark every pending step whose dependency chain is already broken, until
/// nothing changes. A dependency that ends `Failed`, `TimedOut` or `Skipped`
/// dooms all transitive dependents.
fn propagate_skips(state: &mut ExecutionState, steps: &[WorkflowStep]) {
    loop {
        let mut changed = false;
        for step in steps {
            if state.status(&step.id) != StepStatus::Pending {
                continue;
            }
            let doomed = step.dependencies.iter().any(|dep| {
                let status = state.status(dep);
                status.is_terminal() && !status.is_success()
            });
            if doomed {
                state.mark(&step.id, StepStatus::Skipped);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
