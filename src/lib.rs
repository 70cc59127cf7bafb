//! # TrustFlow — request analysis orchestration
//!
//! `trustflow` classifies a free-text business request into a vertical and
//! use case, binds it to a pre-configured analysis workflow, executes the
//! workflow's capabilities with dependency-aware scheduling, and aggregates
//! per-dimension trust scores (Security / Integrity / Accuracy). It supports:
//!
//! - **Heuristic classification**: rule-table driven vertical, use-case,
//!   entity and intent detection with calibrated confidence.
//! - **Use-case binding**: catalog resolution, one-time workflow
//!   customization, confidence-scaled timeout budgets.
//! - **Dependency-gated scheduling**: steps form a DAG, independent steps
//!   dispatch concurrently, broken dependency chains skip transitively.
//! - **Timeouts and cancellation**: a three-way race per step (capability
//!   response / per-step timeout / level-triggered cancellation) plus an
//!   execution-wide budget.
//! - **Score aggregation**: confidence-weighted blending with flat
//!   critical-flag penalties, clamped to `[0, 100]`.
//! - **Audit seam**: best-effort per-step outcome reporting that never aborts
//!   a run.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trustflow::{AnalysisPipeline, AnalysisRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = AnalysisPipeline::new();
//!     let request = AnalysisRequest::new(
//!         "Review this oil and gas lease agreement for mineral rights compliance",
//!     );
//!     let outcome = pipeline.analyze(&request).await.unwrap();
//!     println!("{:?} {:?}", outcome.result.status, outcome.result.scores);
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod audit;
pub mod binder;
pub mod capability;
pub mod catalog;
pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod workflow;

pub use crate::aggregator::{aggregate, AggregatedScore, BaseScores};
pub use crate::api::{AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder};
pub use crate::audit::{AuditEvent, AuditSink, MemoryAuditSink, NoopAuditSink, TracingAuditSink};
pub use crate::binder::{Binding, BindingContext, UseCaseBinder};
pub use crate::capability::{
    AnalysisRequest, Capability, CapabilityRegistry, CapabilityResult, Flag, FlagSeverity,
    BASELINE_CAPABILITIES,
};
pub use crate::catalog::{ScoreThreshold, UseCaseCatalog, UseCaseDefinition};
pub use crate::classifier::{ClassificationResult, Entity, EntityType, PromptClassifier};
pub use crate::error::{PipelineError, PipelineResult, StepError};
pub use crate::orchestrator::{
    CancelSignal, CancellationRegistry, ExecutionStatus, OrchestrationResult, StepFailure,
    StepStatus, WorkflowOrchestrator,
};
pub use crate::workflow::{validate_workflow, Workflow, WorkflowStep};
