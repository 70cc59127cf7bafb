//! Built-in use-case definitions loaded by [`UseCaseCatalog::with_defaults`].
//!
//! The full production catalog is vertical-owned data; these entries cover
//! each built-in vertical well enough to bind and execute real requests.

use std::collections::HashMap;

use serde_json::json;

use crate::aggregator::BaseScores;
use crate::workflow::{Workflow, WorkflowStep};

use super::{ScoreThreshold, UseCaseDefinition, GENERAL_ANALYSIS};

fn threshold(min: f64) -> ScoreThreshold {
    ScoreThreshold {
        min: Some(min),
        max: None,
    }
}

struct Spec<'a> {
    id: &'a str,
    vertical: &'a str,
    name: &'a str,
    keywords: &'a [&'a str],
    regulations: &'a [&'a str],
    required_capabilities: &'a [&'a str],
    steps: Vec<WorkflowStep>,
    base_scores: BaseScores,
}

fn build(spec: Spec<'_>) -> UseCaseDefinition {
    let mut thresholds = HashMap::new();
    thresholds.insert("security".to_string(), threshold(60.0));
    thresholds.insert("integrity".to_string(), threshold(60.0));
    thresholds.insert("accuracy".to_string(), threshold(55.0));
    UseCaseDefinition {
        id: spec.id.to_string(),
        vertical: spec.vertical.to_string(),
        name: spec.name.to_string(),
        keywords: spec.keywords.iter().map(|s| s.to_string()).collect(),
        base_workflow: Workflow::new(format!("{}-workflow", spec.id), spec.steps),
        required_capabilities: spec
            .required_capabilities
            .iter()
            .map(|s| s.to_string())
            .collect(),
        regulations: spec.regulations.iter().map(|s| s.to_string()).collect(),
        thresholds,
        base_scores: spec.base_scores,
    }
}

fn compliance_step(id: &str, regulations: &[&str], deps: &[&str]) -> WorkflowStep {
    WorkflowStep::new(id, "regulatory-compliance")
        .with_dependencies(deps.iter().map(|s| s.to_string()).collect())
        .with_config(json!({ "regulations": regulations }))
}

pub(super) fn default_definitions() -> Vec<UseCaseDefinition> {
    vec![
        build(Spec {
            id: "energy-oil-gas-lease",
            vertical: "energy",
            name: "Oil & Gas Lease Review",
            keywords: &["oil", "gas", "lease", "mineral", "royalty"],
            regulations: &["BLM", "FERC"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("lease-review", "document-analysis"),
                compliance_step("lease-compliance", &["BLM", "FERC"], &["lease-review"]),
            ],
            base_scores: BaseScores {
                security: 80.0,
                integrity: 85.0,
                accuracy: 80.0,
            },
        }),
        build(Spec {
            id: "energy-utility-rate-review",
            vertical: "energy",
            name: "Utility Rate Case Review",
            keywords: &["utility", "tariff", "rate", "filing"],
            regulations: &["FERC"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("filing-review", "document-analysis"),
                compliance_step("tariff-compliance", &["FERC"], &["filing-review"]),
            ],
            base_scores: BaseScores {
                security: 75.0,
                integrity: 80.0,
                accuracy: 85.0,
            },
        }),
        build(Spec {
            id: "healthcare-hipaa-audit",
            vertical: "healthcare",
            name: "HIPAA Compliance Audit",
            keywords: &["hipaa", "phi", "patient", "privacy"],
            regulations: &["HIPAA"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("records-review", "document-analysis"),
                compliance_step("hipaa-compliance", &["HIPAA"], &["records-review"]),
            ],
            base_scores: BaseScores {
                security: 90.0,
                integrity: 85.0,
                accuracy: 80.0,
            },
        }),
        build(Spec {
            id: "healthcare-claims-billing",
            vertical: "healthcare",
            name: "Claims & Billing Review",
            keywords: &["claims", "billing", "codes", "medical"],
            regulations: &["HIPAA", "CMS"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("claims-review", "document-analysis"),
                compliance_step("billing-compliance", &["CMS"], &["claims-review"]),
            ],
            base_scores: BaseScores {
                security: 80.0,
                integrity: 85.0,
                accuracy: 90.0,
            },
        }),
        build(Spec {
            id: "financial-loan-review",
            vertical: "financial-services",
            name: "Loan File Review",
            keywords: &["loan", "underwriting", "credit", "portfolio"],
            regulations: &["TILA", "ECOA"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("loan-file-review", "document-analysis"),
                compliance_step("lending-compliance", &["TILA", "ECOA"], &["loan-file-review"]),
            ],
            base_scores: BaseScores {
                security: 80.0,
                integrity: 85.0,
                accuracy: 85.0,
            },
        }),
        build(Spec {
            id: "financial-aml-screening",
            vertical: "financial-services",
            name: "AML Screening",
            keywords: &["aml", "laundering", "suspicious", "transaction"],
            regulations: &["BSA", "OFAC"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("transaction-review", "document-analysis"),
                compliance_step("aml-compliance", &["BSA", "OFAC"], &["transaction-review"]),
            ],
            base_scores: BaseScores {
                security: 90.0,
                integrity: 90.0,
                accuracy: 80.0,
            },
        }),
        build(Spec {
            id: "legal-contract-review",
            vertical: "legal",
            name: "Contract Review",
            keywords: &["contract", "clause", "agreement", "indemnification"],
            regulations: &["UCC"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("contract-review", "document-analysis"),
                compliance_step("contract-compliance", &["UCC"], &["contract-review"]),
            ],
            base_scores: BaseScores {
                security: 75.0,
                integrity: 85.0,
                accuracy: 85.0,
            },
        }),
        build(Spec {
            id: "insurance-claim-review",
            vertical: "insurance",
            name: "Insurance Claim Review",
            keywords: &["claim", "policy", "coverage", "adjuster"],
            regulations: &["NAIC"],
            required_capabilities: &["field-extraction"],
            steps: vec![
                WorkflowStep::new("claim-review", "document-analysis"),
                compliance_step("claim-compliance", &["NAIC"], &["claim-review"]),
            ],
            base_scores: BaseScores {
                security: 80.0,
                integrity: 85.0,
                accuracy: 85.0,
            },
        }),
        build(Spec {
            id: GENERAL_ANALYSIS,
            vertical: "general",
            name: "General Analysis",
            keywords: &[],
            regulations: &[],
            required_capabilities: &["field-extraction"],
            steps: vec![WorkflowStep::new("general-review", "document-analysis")],
            base_scores: BaseScores::default(),
        }),
    ]
}
