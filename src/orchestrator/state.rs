//! Execution bookkeeping: per-step status, the overall status, and the
//! orchestration result handed to reporting.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::AggregatedScore;
use crate::capability::{CapabilityResult, Flag, FlagSeverity};

/// Per-step state machine: `Pending -> Running -> {Done|Failed|TimedOut|Skipped}`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    Pending,
    Running,
    Done,
    Failed,
    TimedOut,
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepStatus::Pending | StepStatus::Running)
    }

    /// Terminal and usable as a satisfied dependency.
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Done)
    }
}

/// Overall execution status.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStatus {
    Completed,
    /// Completed, but with optional-step failures on record.
    Partial,
    Failed,
    Cancelled,
}

/// One recorded step failure.
#[derive(Serialize, Debug, Clone)]
pub struct StepFailure {
    pub step_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl StepFailure {
    pub fn now(step_id: impl Into<String>, message: impl Into<String>) -> Self {
        StepFailure {
            step_id: step_id.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Mutable state owned by exactly one execution.
pub struct ExecutionState {
    pub execution_id: String,
    status: HashMap<String, StepStatus>,
    /// Declaration order, baseline steps first.
    order: Vec<String>,
}

impl ExecutionState {
    pub fn new(execution_id: String, step_ids: Vec<String>) -> Self {
        let status = step_ids
            .iter()
            .map(|id| (id.clone(), StepStatus::Pending))
            .collect();
        ExecutionState {
            execution_id,
            status,
            order: step_ids,
        }
    }

    pub fn mark(&mut self, step_id: &str, status: StepStatus) {
        if let Some(entry) = self.status.get_mut(step_id) {
            *entry = status;
        }
    }

    pub fn status(&self, step_id: &str) -> StepStatus {
        self.status
            .get(step_id)
            .copied()
            .unwrap_or(StepStatus::Pending)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Mark every still-pending step `Skipped`.
    pub fn skip_pending(&mut self) {
        for status in self.status.values_mut() {
            if *status == StepStatus::Pending {
                *status = StepStatus::Skipped;
            }
        }
    }

    pub fn count(&self, wanted: StepStatus) -> usize {
        self.status.values().filter(|s| **s == wanted).count()
    }

    pub fn into_status_map(self) -> HashMap<String, StepStatus> {
        self.status
    }
}

/// Final product of one orchestration, consumed by the report trigger.
#[derive(Serialize, Debug, Clone)]
pub struct OrchestrationResult {
    pub execution_id: String,
    pub use_case_id: String,
    pub status: ExecutionStatus,
    pub results: HashMap<String, CapabilityResult>,
    pub step_status: HashMap<String, StepStatus>,
    pub scores: AggregatedScore,
    pub duration_ms: u64,
    pub errors: Vec<StepFailure>,
}

impl OrchestrationResult {
    /// Critical flags across all step results, for reporting.
    pub fn critical_issues(&self) -> Vec<&Flag> {
        self.results
            .values()
            .flat_map(|r| r.flags.iter())
            .filter(|f| f.severity == FlagSeverity::Critical)
            .collect()
    }

    /// Deduplicated recommendations across all step results.
    pub fn recommendations(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for result in self.results.values() {
            for rec in &result.recommendations {
                if !seen.contains(rec) {
                    seen.push(rec.clone());
                }
            }
        }
        seen
    }
}
