//! High-level analysis pipeline and builder.
//!
//! [`AnalysisPipeline`] (constructed via [`AnalysisPipelineBuilder`]) is the
//! main entry point: it wires the classifier, catalog, binder, capability
//! registry, orchestrator and audit sink together and runs
//! classify → bind → execute → aggregate for each request.

use std::sync::Arc;

use uuid::Uuid;

use crate::audit::{AuditSink, NoopAuditSink};
use crate::binder::UseCaseBinder;
use crate::capability::{AnalysisRequest, CapabilityRegistry};
use crate::catalog::UseCaseCatalog;
use crate::classifier::{ClassificationResult, PromptClassifier};
use crate::error::PipelineError;
use crate::orchestrator::{CancellationRegistry, OrchestrationResult, WorkflowOrchestrator};

/// Everything a downstream consumer needs from one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub classification: ClassificationResult,
    pub binding_id: String,
    pub use_case_id: String,
    pub result: OrchestrationResult,
}

/// The classify → bind → execute → aggregate pipeline.
pub struct AnalysisPipeline {
    classifier: PromptClassifier,
    binder: UseCaseBinder,
    orchestrator: WorkflowOrchestrator,
    cancellations: Arc<CancellationRegistry>,
}

impl AnalysisPipeline {
    /// Create a new builder.
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder {
            catalog: None,
            registry: None,
            audit: None,
        }
    }

    /// Pipeline over the default catalog and built-in capabilities.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Classify the request text and run the bound workflow.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, PipelineError> {
        self.analyze_inner(request, None).await
    }

    /// Skip use-case inference and bind the given id directly.
    pub async fn analyze_with_use_case(
        &self,
        request: &AnalysisRequest,
        use_case_id: &str,
    ) -> Result<AnalysisOutcome, PipelineError> {
        self.analyze_inner(request, Some(use_case_id)).await
    }

    /// Request cancellation of a running execution. Returns false when the
    /// execution is unknown or already finished.
    pub fn cancel(&self, execution_id: &str) -> bool {
        self.cancellations.cancel(execution_id)
    }

    /// Ids of executions currently registered for cancellation.
    pub fn active_executions(&self) -> Vec<String> {
        self.cancellations.active_ids()
    }

    /// Classification without execution, for callers that only need routing.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    async fn analyze_inner(
        &self,
        request: &AnalysisRequest,
        explicit_use_case: Option<&str>,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let classification = self.classifier.classify(&request.text);
        tracing::debug!(
            vertical = classification.vertical.as_deref(),
            use_case = classification.use_case.as_deref(),
            confidence = classification.confidence,
            "request classified"
        );
        let binding = self.binder.bind(&classification, explicit_use_case)?;

        let execution_id = Uuid::new_v4().to_string();
        let signal = self.cancellations.register(&execution_id);
        let result = self
            .orchestrator
            .execute_prepared(execution_id.clone(), &binding, request, signal)
            .await;
        self.cancellations.remove(&execution_id);
        let result = result?;

        Ok(AnalysisOutcome {
            classification,
            binding_id: binding.id,
            use_case_id: binding.use_case_id,
            result,
        })
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring an [`AnalysisPipeline`].
pub struct AnalysisPipelineBuilder {
    catalog: Option<Arc<UseCaseCatalog>>,
    registry: Option<Arc<CapabilityRegistry>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl AnalysisPipelineBuilder {
    /// Substitute the use-case catalog (tests inject fakes here).
    pub fn catalog(mut self, catalog: Arc<UseCaseCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Substitute the capability registry.
    pub fn registry(mut self, registry: Arc<CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attach an audit sink; the default discards events.
    pub fn audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> AnalysisPipeline {
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(UseCaseCatalog::with_defaults()));
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(CapabilityRegistry::new()));
        let audit = self.audit.unwrap_or_else(|| Arc::new(NoopAuditSink));

        AnalysisPipeline {
            classifier: PromptClassifier::new(),
            binder: UseCaseBinder::new(catalog),
            orchestrator: WorkflowOrchestrator::with_audit_sink(registry, audit),
            cancellations: Arc::new(CancellationRegistry::new()),
        }
    }
}
