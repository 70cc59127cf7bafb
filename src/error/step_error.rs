use thiserror::Error;

/// Step-level errors
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Capability not found: {0}")]
    CapabilityNotFound(String),
    #[error("Capability disabled: {0}")]
    CapabilityDisabled(String),
    #[error("Timeout: step exceeded {ms}ms")]
    Timeout { ms: u64 },
    #[error("Step cancelled")]
    Cancelled,
    #[error("Execution error: {0}")]
    ExecutionError(String),
    #[error("Invalid result: {0}")]
    InvalidResult(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StepError {
    /// Whether this error terminates the step as timed-out rather than failed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, StepError::Timeout { .. })
    }
}

impl From<serde_json::Error> for StepError {
    fn from(e: serde_json::Error) -> Self {
        StepError::SerializationError(e.to_string())
    }
}
