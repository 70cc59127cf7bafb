//! Audit collaborator seam. Every step outcome is reported here best-effort;
//! a sink failure never aborts the orchestration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::orchestrator::StepStatus;

#[derive(Debug, Error)]
#[error("Audit sink error: {0}")]
pub struct AuditError(pub String);

/// One step outcome, as reported to the audit trail.
#[derive(Serialize, Debug, Clone)]
pub struct AuditEvent {
    pub execution_id: String,
    pub step_id: String,
    pub capability_id: String,
    pub status: StepStatus,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Fire-and-forget audit recording.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Discards everything.
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Emits one structured log line per outcome.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            execution_id = %event.execution_id,
            step_id = %event.step_id,
            capability_id = %event.capability_id,
            status = ?event.status,
            error = event.error.as_deref(),
            "step outcome"
        );
        Ok(())
    }
}

/// Collects events in memory; test double.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events.lock().push(event);
        Ok(())
    }
}
