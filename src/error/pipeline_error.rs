//! Pipeline-level error types.

use super::StepError;
use thiserror::Error;

/// Errors raised by binding and execution setup. Individual step failures are
/// recorded in the orchestration result instead of being raised through here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Use case not found: {0}")]
    UseCaseNotFound(String),
    #[error("Cycle detected in workflow: {0}")]
    CycleDetected(String),
    #[error("Unknown dependency '{dependency}' declared by step '{step}'")]
    UnknownDependency { step: String, dependency: String },
    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),
    #[error("Workflow has no steps: {0}")]
    EmptyWorkflow(String),
    #[error("Catalog is sealed; no further registrations accepted")]
    CatalogSealed,
    #[error("Duplicate use case id: {0}")]
    DuplicateUseCase(String),
    #[error("Execution cancelled")]
    Cancelled,
    #[error("Step error: {0}")]
    StepError(Box<StepError>),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StepError> for PipelineError {
    fn from(value: StepError) -> Self {
        PipelineError::StepError(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display() {
        assert_eq!(
            PipelineError::UseCaseNotFound("x".into()).to_string(),
            "Use case not found: x"
        );
        assert_eq!(
            PipelineError::CycleDetected("wf".into()).to_string(),
            "Cycle detected in workflow: wf"
        );
        assert_eq!(
            PipelineError::UnknownDependency {
                step: "b".into(),
                dependency: "a".into()
            }
            .to_string(),
            "Unknown dependency 'a' declared by step 'b'"
        );
        assert_eq!(
            PipelineError::DuplicateStep("s".into()).to_string(),
            "Duplicate step id: s"
        );
        assert_eq!(
            PipelineError::Cancelled.to_string(),
            "Execution cancelled"
        );
    }

    #[test]
    fn test_pipeline_error_from_step_error() {
        let step_err = StepError::Cancelled;
        let err: PipelineError = step_err.into();
        assert!(matches!(err, PipelineError::StepError(_)));
        assert!(err.to_string().contains("cancelled"));
    }
}
