//! Use-case catalog: the static map from use-case id to analysis profile.
//!
//! The catalog is append-only and initialize-once: entries are registered
//! during startup (or by tests through the same guarded API) and the store is
//! sealed before serving traffic. Insertion order is observable; the binder
//! uses it as the inference tie-break.

mod defaults;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::aggregator::BaseScores;
use crate::error::PipelineError;
use crate::workflow::Workflow;

/// Use-case id of the fallback entry every default catalog carries.
pub const GENERAL_ANALYSIS: &str = "general-analysis";

/// Score band a use case expects a dimension to land in.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreThreshold {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A named, pre-configured analysis scenario within a vertical.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UseCaseDefinition {
    pub id: String,
    pub vertical: String,
    pub name: String,
    /// Matching hints for binder inference.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub base_workflow: Workflow,
    /// Capabilities the binder appends as dynamic optional steps when absent.
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub regulations: Vec<String>,
    #[serde(default)]
    pub thresholds: HashMap<String, ScoreThreshold>,
    #[serde(default)]
    pub base_scores: BaseScores,
}

struct CatalogInner {
    entries: Vec<Arc<UseCaseDefinition>>,
    index: HashMap<String, usize>,
    sealed: bool,
}

/// Initialize-once, read-mostly store of use-case definitions.
pub struct UseCaseCatalog {
    inner: RwLock<CatalogInner>,
}

impl UseCaseCatalog {
    /// Empty, unsealed catalog.
    pub fn new() -> Self {
        UseCaseCatalog {
            inner: RwLock::new(CatalogInner {
                entries: Vec::new(),
                index: HashMap::new(),
                sealed: false,
            }),
        }
    }

    /// Catalog pre-loaded with the built-in vertical definitions, sealed.
    pub fn with_defaults() -> Self {
        let catalog = Self::new();
        for definition in defaults::default_definitions() {
            catalog
                .register(definition)
                .expect("default catalog entries are unique");
        }
        catalog.seal();
        catalog
    }

    /// Append a definition. Rejected after [`seal`](Self::seal) and for
    /// duplicate ids.
    pub fn register(&self, definition: UseCaseDefinition) -> Result<(), PipelineError> {
        let mut inner = self.inner.write();
        if inner.sealed {
            return Err(PipelineError::CatalogSealed);
        }
        if inner.index.contains_key(&definition.id) {
            return Err(PipelineError::DuplicateUseCase(definition.id));
        }
        let idx = inner.entries.len();
        inner.index.insert(definition.id.clone(), idx);
        inner.entries.push(Arc::new(definition));
        Ok(())
    }

    /// Close the catalog for registration.
    pub fn seal(&self) {
        self.inner.write().sealed = true;
    }

    pub fn get(&self, id: &str) -> Option<Arc<UseCaseDefinition>> {
        let inner = self.inner.read();
        inner.index.get(id).map(|&idx| inner.entries[idx].clone())
    }

    /// Entries for a vertical, in insertion order.
    pub fn list_by_vertical(&self, vertical: &str) -> Vec<Arc<UseCaseDefinition>> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|e| e.vertical == vertical)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

impl Default for UseCaseCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
