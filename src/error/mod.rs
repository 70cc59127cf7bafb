//! Error types, split by scope: [`StepError`] for a single capability
//! invocation, [`PipelineError`] for binding and execution setup.

mod pipeline_error;
mod step_error;

pub use pipeline_error::PipelineError;
pub use step_error::StepError;

/// Convenience alias for pipeline-level results.
pub type PipelineResult<T> = Result<T, PipelineError>;
