//! Scheduling semantics of the workflow orchestrator: required/optional
//! failure handling, skip propagation, timeouts, budgets and cancellation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use trustflow::{
    AnalysisRequest, BaseScores, Binding, BindingContext, CancelSignal, Capability,
    CapabilityRegistry, CapabilityResult, ClassificationResult, ExecutionStatus, MemoryAuditSink,
    PipelineError, StepError, StepStatus, Workflow, WorkflowOrchestrator, WorkflowStep,
    BASELINE_CAPABILITIES,
};

struct StaticCapability {
    id: &'static str,
}

#[async_trait]
impl Capability for StaticCapability {
    fn id(&self) -> &str {
        self.id
    }

    async fn invoke(
        &self,
        _request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        Ok(CapabilityResult {
            score: Some(80.0),
            confidence: Some(0.5),
            dimension: Some("accuracy".to_string()),
            ..Default::default()
        })
    }
}

struct FailingCapability {
    id: &'static str,
}

#[async_trait]
impl Capability for FailingCapability {
    fn id(&self) -> &str {
        self.id
    }

    async fn invoke(
        &self,
        _request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        Err(StepError::ExecutionError("deliberate failure".to_string()))
    }
}

struct SlowCapability {
    id: &'static str,
    delay_ms: u64,
}

#[async_trait]
impl Capability for SlowCapability {
    fn id(&self) -> &str {
        self.id
    }

    async fn invoke(
        &self,
        _request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(CapabilityResult::default())
    }
}

struct BlockingCapability {
    id: &'static str,
}

#[async_trait]
impl Capability for BlockingCapability {
    fn id(&self) -> &str {
        self.id
    }

    async fn invoke(
        &self,
        _request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        futures::future::pending::<()>().await;
        unreachable!()
    }
}

struct BarrierCapability {
    id: &'static str,
    barrier: Arc<tokio::sync::Barrier>,
}

#[async_trait]
impl Capability for BarrierCapability {
    fn id(&self) -> &str {
        self.id
    }

    async fn invoke(
        &self,
        _request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        self.barrier.wait().await;
        Ok(CapabilityResult::default())
    }
}

/// Registry whose baseline capabilities always succeed instantly.
fn registry_with(extra: Vec<Arc<dyn Capability>>) -> Arc<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::empty();
    for id in BASELINE_CAPABILITIES {
        registry.register(Arc::new(StaticCapability { id }));
    }
    for capability in extra {
        registry.register(capability);
    }
    Arc::new(registry)
}

fn binding_for(workflow: Workflow) -> Binding {
    let timeout_budget_ms = workflow.timeout_budget_ms();
    Binding {
        id: "test-binding".to_string(),
        use_case_id: "test-case".to_string(),
        classification: ClassificationResult {
            vertical: None,
            use_case: None,
            keywords: vec![],
            entities: vec![],
            intent: "review".to_string(),
            confidence: 0.9,
        },
        workflow,
        context: BindingContext {
            vertical: "test".to_string(),
            use_case: "test-case".to_string(),
            regulations: vec![],
            thresholds: HashMap::new(),
            base_scores: BaseScores::default(),
        },
        timeout_budget_ms,
    }
}

fn abc_workflow() -> Workflow {
    Workflow::new(
        "abc",
        vec![
            WorkflowStep::new("a", "cap-ok"),
            WorkflowStep::new("b", "cap-fail").with_dependencies(vec!["a".to_string()]),
            WorkflowStep::new("c", "cap-ok2")
                .with_dependencies(vec!["b".to_string()])
                .optional(),
        ],
    )
}

#[tokio::test]
async fn required_failure_halts_and_skips_dependents() {
    let registry = registry_with(vec![
        Arc::new(StaticCapability { id: "cap-ok" }),
        Arc::new(FailingCapability { id: "cap-fail" }),
        Arc::new(StaticCapability { id: "cap-ok2" }),
    ]);
    let orchestrator = WorkflowOrchestrator::new(registry);
    let binding = binding_for(abc_workflow());

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.step_status["a"], StepStatus::Done);
    assert_eq!(result.step_status["b"], StepStatus::Failed);
    assert_eq!(result.step_status["c"], StepStatus::Skipped);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].step_id, "b");
}

#[tokio::test]
async fn optional_failure_leaves_a_partial_run() {
    let registry = registry_with(vec![
        Arc::new(StaticCapability { id: "cap-ok" }),
        Arc::new(FailingCapability { id: "cap-fail" }),
        Arc::new(StaticCapability { id: "cap-ok2" }),
    ]);
    let orchestrator = WorkflowOrchestrator::new(registry);

    let workflow = Workflow::new(
        "partial",
        vec![
            WorkflowStep::new("a", "cap-ok"),
            WorkflowStep::new("b", "cap-fail")
                .with_dependencies(vec!["a".to_string()])
                .optional(),
            WorkflowStep::new("c", "cap-ok2").with_dependencies(vec!["a".to_string()]),
        ],
    );
    let binding = binding_for(workflow);

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Partial);
    assert_eq!(result.step_status["b"], StepStatus::Failed);
    assert_eq!(result.step_status["c"], StepStatus::Done);
    assert!(!result.errors.is_empty());
}

#[tokio::test]
async fn skipped_dependents_of_optional_failures() {
    let registry = registry_with(vec![
        Arc::new(FailingCapability { id: "cap-fail" }),
        Arc::new(StaticCapability { id: "cap-ok" }),
    ]);
    let orchestrator = WorkflowOrchestrator::new(registry);

    let workflow = Workflow::new(
        "opt-chain",
        vec![
            WorkflowStep::new("a", "cap-fail").optional(),
            WorkflowStep::new("b", "cap-ok")
                .with_dependencies(vec!["a".to_string()])
                .optional(),
        ],
    );
    let binding = binding_for(workflow);

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Partial);
    assert_eq!(result.step_status["a"], StepStatus::Failed);
    assert_eq!(result.step_status["b"], StepStatus::Skipped);
}

#[tokio::test]
async fn per_step_timeout_terminates_the_step() {
    let registry = registry_with(vec![Arc::new(SlowCapability {
        id: "cap-slow",
        delay_ms: 500,
    })]);
    let orchestrator = WorkflowOrchestrator::new(registry);

    let workflow = Workflow::new(
        "timeout",
        vec![WorkflowStep::new("slow", "cap-slow").with_timeout_ms(50)],
    );
    let binding = binding_for(workflow);

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.step_status["slow"], StepStatus::TimedOut);
    assert!(result.errors[0].message.contains("50ms"));
}

#[tokio::test]
async fn execution_budget_exhaustion_skips_the_tail() {
    let registry = registry_with(vec![
        Arc::new(SlowCapability {
            id: "cap-slow",
            delay_ms: 80,
        }),
        Arc::new(StaticCapability { id: "cap-ok" }),
    ]);
    let orchestrator = WorkflowOrchestrator::new(registry);

    let workflow = Workflow::new(
        "budget",
        vec![
            WorkflowStep::new("first", "cap-slow").with_timeout_ms(5_000),
            WorkflowStep::new("second", "cap-ok").with_dependencies(vec!["first".to_string()]),
        ],
    );
    let mut binding = binding_for(workflow);
    binding.timeout_budget_ms = 40;

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.step_status["first"], StepStatus::Done);
    assert_eq!(result.step_status["second"], StepStatus::Skipped);
    assert!(result
        .errors
        .iter()
        .any(|e| e.message.contains("budget")));
}

#[tokio::test]
async fn cancellation_before_any_step_yields_zero_done_steps() {
    let mut registry = CapabilityRegistry::empty();
    // The very first baseline step blocks until cancellation fires.
    registry.register(Arc::new(BlockingCapability {
        id: "security-scan",
    }));
    registry.register(Arc::new(StaticCapability {
        id: "integrity-check",
    }));
    registry.register(Arc::new(StaticCapability {
        id: "accuracy-review",
    }));
    registry.register(Arc::new(StaticCapability { id: "cap-ok" }));
    let orchestrator = WorkflowOrchestrator::new(Arc::new(registry));

    let workflow = Workflow::new("cancel", vec![WorkflowStep::new("a", "cap-ok")]);
    let binding = binding_for(workflow);
    let signal = CancelSignal::new();
    let request = AnalysisRequest::new("req");

    let trigger = signal.clone();
    let (result, _) = tokio::join!(
        orchestrator.execute_with_signal(&binding, &request, signal),
        async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.trigger();
        }
    );
    let result = result.unwrap();

    assert_eq!(result.status, ExecutionStatus::Cancelled);
    assert_eq!(
        result
            .step_status
            .values()
            .filter(|s| **s == StepStatus::Done)
            .count(),
        0
    );
    // Never-started steps stay pending under cancellation.
    assert_eq!(result.step_status["a"], StepStatus::Pending);
}

#[tokio::test]
async fn pre_triggered_signal_is_a_setup_error() {
    let registry = registry_with(vec![Arc::new(StaticCapability { id: "cap-ok" })]);
    let orchestrator = WorkflowOrchestrator::new(registry);
    let binding = binding_for(Workflow::new(
        "w",
        vec![WorkflowStep::new("a", "cap-ok")],
    ));

    let signal = CancelSignal::new();
    signal.trigger();
    let err = orchestrator
        .execute_with_signal(&binding, &AnalysisRequest::new("req"), signal)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
}

#[tokio::test]
async fn baseline_failure_aborts_before_workflow_steps() {
    let mut registry = CapabilityRegistry::empty();
    registry.register(Arc::new(FailingCapability {
        id: "security-scan",
    }));
    registry.register(Arc::new(StaticCapability {
        id: "integrity-check",
    }));
    registry.register(Arc::new(StaticCapability {
        id: "accuracy-review",
    }));
    registry.register(Arc::new(StaticCapability { id: "cap-ok" }));
    let orchestrator = WorkflowOrchestrator::new(Arc::new(registry));

    let binding = binding_for(Workflow::new(
        "w",
        vec![WorkflowStep::new("a", "cap-ok")],
    ));
    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.step_status["baseline-security"], StepStatus::Failed);
    assert_eq!(
        result.step_status["baseline-integrity"],
        StepStatus::Skipped
    );
    assert_eq!(result.step_status["a"], StepStatus::Skipped);
}

#[tokio::test]
async fn missing_and_disabled_capabilities_fail_only_their_step() {
    let registry = registry_with(vec![
        Arc::new(StaticCapability { id: "cap-ok" }),
        Arc::new(StaticCapability { id: "cap-off" }),
    ]);
    registry.set_enabled("cap-off", false);
    let orchestrator = WorkflowOrchestrator::new(registry);

    let workflow = Workflow::new(
        "missing",
        vec![
            WorkflowStep::new("known", "cap-ok"),
            WorkflowStep::new("ghost", "cap-ghost").optional(),
            WorkflowStep::new("off", "cap-off").optional(),
        ],
    );
    let binding = binding_for(workflow);

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Partial);
    assert_eq!(result.step_status["known"], StepStatus::Done);
    assert_eq!(result.step_status["ghost"], StepStatus::Failed);
    assert_eq!(result.step_status["off"], StepStatus::Failed);
    let messages: Vec<&str> = result.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("not found")));
    assert!(messages.iter().any(|m| m.contains("disabled")));
}

#[tokio::test]
async fn independent_steps_dispatch_concurrently() {
    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    let registry = registry_with(vec![
        Arc::new(BarrierCapability {
            id: "cap-left",
            barrier: barrier.clone(),
        }),
        Arc::new(BarrierCapability {
            id: "cap-right",
            barrier,
        }),
    ]);
    let orchestrator = WorkflowOrchestrator::new(registry);

    // Each step only completes once the other is also in flight; sequential
    // dispatch would time both out.
    let workflow = Workflow::new(
        "concurrent",
        vec![
            WorkflowStep::new("left", "cap-left").with_timeout_ms(1_000),
            WorkflowStep::new("right", "cap-right").with_timeout_ms(1_000),
        ],
    );
    let binding = binding_for(workflow);

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.step_status["left"], StepStatus::Done);
    assert_eq!(result.step_status["right"], StepStatus::Done);
}

#[tokio::test]
async fn audit_sink_sees_one_event_per_attempted_step() {
    let audit = Arc::new(MemoryAuditSink::new());
    let registry = registry_with(vec![
        Arc::new(StaticCapability { id: "cap-ok" }),
        Arc::new(StaticCapability { id: "cap-ok2" }),
    ]);
    let orchestrator = WorkflowOrchestrator::with_audit_sink(registry, audit.clone());

    let workflow = Workflow::new(
        "audited",
        vec![
            WorkflowStep::new("a", "cap-ok"),
            WorkflowStep::new("b", "cap-ok2").with_dependencies(vec!["a".to_string()]),
        ],
    );
    let binding = binding_for(workflow);

    let result = orchestrator
        .execute(&binding, &AnalysisRequest::new("req"))
        .await
        .unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);

    let events = audit.events();
    // Three baseline steps plus two workflow steps.
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.status == StepStatus::Done));
    assert!(events.iter().all(|e| e.execution_id == result.execution_id));
}
