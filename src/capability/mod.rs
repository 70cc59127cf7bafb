//! Analysis capabilities ("agents") and their registry.
//!
//! A capability is a named, independently invokable analysis unit. The
//! orchestrator dispatches workflow steps to capabilities through
//! [`CapabilityRegistry`]; registrations are read-mostly and lookups are safe
//! across concurrent executions.

mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StepError;

pub use builtin::{
    AccuracyReviewCapability, DocumentAnalysisCapability, FieldExtractionCapability,
    IntegrityCheckCapability, RegulatoryComplianceCapability, SecurityScanCapability,
};

/// The three capabilities every execution runs first, in this order, one per
/// trust dimension.
pub const BASELINE_CAPABILITIES: &[&str] =
    &["security-scan", "integrity-check", "accuracy-review"];

/// Severity of a finding attached to a capability result.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FlagSeverity {
    Info,
    Warning,
    Critical,
}

/// A finding raised by a capability, attributed to a score dimension.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Flag {
    pub severity: FlagSeverity,
    /// Score dimension the flag counts against: `security`, `integrity` or
    /// `accuracy`.
    pub category: String,
    pub message: String,
}

impl Flag {
    pub fn critical(category: impl Into<String>, message: impl Into<String>) -> Self {
        Flag {
            severity: FlagSeverity::Critical,
            category: category.into(),
            message: message.into(),
        }
    }

    pub fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Flag {
            severity: FlagSeverity::Warning,
            category: category.into(),
            message: message.into(),
        }
    }
}

/// Result of one capability invocation.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CapabilityResult {
    /// Candidate score for `dimension`, `[0, 100]`.
    #[serde(default)]
    pub score: Option<f64>,
    /// Blend weight for `score`; the aggregator defaults it to 0.5.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Score dimension this result blends into.
    #[serde(rename = "type", default)]
    pub dimension: Option<String>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Free-form findings for downstream reporting.
    #[serde(default)]
    pub details: Value,
}

/// The request a capability analyzes: the original prompt plus a structured
/// payload supplied by the caller.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default)]
    pub payload: Value,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        AnalysisRequest {
            text: text.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Trait for analysis capabilities. Each named capability implements this.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Stable capability id used by workflow steps.
    fn id(&self) -> &str;

    /// Capabilities report enabled unless overridden; the registry keeps its
    /// own disable set on top of this.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Run the analysis. `config` is the step's config block.
    async fn invoke(
        &self,
        request: &AnalysisRequest,
        config: &Value,
    ) -> Result<CapabilityResult, StepError>;
}

/// Registry of capabilities by id, with per-id enable/disable state.
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
    disabled: RwLock<std::collections::HashSet<String>>,
}

impl CapabilityRegistry {
    /// Empty registry, for tests that wire their own capabilities.
    pub fn empty() -> Self {
        CapabilityRegistry {
            capabilities: HashMap::new(),
            disabled: RwLock::new(std::collections::HashSet::new()),
        }
    }

    /// Registry pre-populated with the built-in capabilities.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(SecurityScanCapability));
        registry.register(Arc::new(IntegrityCheckCapability));
        registry.register(Arc::new(AccuracyReviewCapability));
        registry.register(Arc::new(DocumentAnalysisCapability));
        registry.register(Arc::new(RegulatoryComplianceCapability));
        registry.register(Arc::new(FieldExtractionCapability));
        registry
    }

    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities
            .insert(capability.id().to_string(), capability);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(id).cloned()
    }

    /// Whether the capability is present, registry-enabled and self-enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        if self.disabled.read().contains(id) {
            return false;
        }
        self.capabilities
            .get(id)
            .map(|c| c.is_enabled())
            .unwrap_or(false)
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) {
        let mut disabled = self.disabled.write();
        if enabled {
            disabled.remove(id);
        } else {
            disabled.insert(id.to_string());
        }
    }

    pub fn registered_ids(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
