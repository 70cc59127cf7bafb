//! Built-in capabilities: the three baseline scans plus the generic
//! vertical-agnostic analysis units.
//!
//! All built-ins are deterministic heuristics over the request text and
//! payload; anything model-backed lives behind external registrations.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::StepError;

use super::{AnalysisRequest, Capability, CapabilityResult, Flag};

/// Markers that depress the security score when present in the request.
const SENSITIVE_MARKERS: &[&str] = &[
    "password",
    "api key",
    "secret",
    "social security",
    "ssn",
    "account number",
];

fn percent_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"\b(\d+(?:\.\d+)?)\s?%").expect("percent pattern"))
}

/// Baseline security scan: flags embedded sensitive material.
pub struct SecurityScanCapability;

#[async_trait]
impl Capability for SecurityScanCapability {
    fn id(&self) -> &str {
        "security-scan"
    }

    async fn invoke(
        &self,
        request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        let haystack = format!("{} {}", request.text, request.payload).to_lowercase();
        let mut flags = Vec::new();
        let mut score: f64 = 92.0;
        for marker in SENSITIVE_MARKERS {
            if haystack.contains(marker) {
                score -= 15.0;
                if *marker == "ssn" || *marker == "social security" {
                    flags.push(Flag::critical(
                        "security",
                        format!("request embeds {marker} data"),
                    ));
                } else {
                    flags.push(Flag::warning(
                        "security",
                        format!("request mentions {marker}"),
                    ));
                }
            }
        }
        Ok(CapabilityResult {
            score: Some(score.max(10.0)),
            confidence: Some(0.8),
            dimension: Some("security".to_string()),
            recommendations: if flags.is_empty() {
                vec![]
            } else {
                vec!["redact sensitive values before analysis".to_string()]
            },
            flags,
            details: Value::Null,
        })
    }
}

/// Baseline integrity check: null or empty payload fields erode the score.
pub struct IntegrityCheckCapability;

#[async_trait]
impl Capability for IntegrityCheckCapability {
    fn id(&self) -> &str {
        "integrity-check"
    }

    async fn invoke(
        &self,
        request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        let mut missing = Vec::new();
        if let Value::Object(map) = &request.payload {
            for (key, value) in map {
                let empty = match value {
                    Value::Null => true,
                    Value::String(s) => s.trim().is_empty(),
                    Value::Array(a) => a.is_empty(),
                    _ => false,
                };
                if empty {
                    missing.push(key.clone());
                }
            }
        }
        let score = (95.0 - 10.0 * missing.len() as f64).max(20.0);
        let flags = missing
            .iter()
            .map(|key| Flag::warning("integrity", format!("field '{key}' is empty")))
            .collect();
        Ok(CapabilityResult {
            score: Some(score),
            confidence: Some(0.7),
            dimension: Some("integrity".to_string()),
            flags,
            recommendations: vec![],
            details: json!({ "empty_fields": missing }),
        })
    }
}

/// Baseline accuracy review: implausible figures in the text erode the score.
pub struct AccuracyReviewCapability;

#[async_trait]
impl Capability for AccuracyReviewCapability {
    fn id(&self) -> &str {
        "accuracy-review"
    }

    async fn invoke(
        &self,
        request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        let mut anomalies = Vec::new();
        for capture in percent_regex().captures_iter(&request.text) {
            let value: f64 = capture[1].parse().map_err(|_| {
                StepError::InvalidResult(format!("unparseable percentage: {}", &capture[0]))
            })?;
            if value > 100.0 {
                anomalies.push(capture[0].to_string());
            }
        }
        let score = (90.0 - 12.0 * anomalies.len() as f64).max(10.0);
        let flags = anomalies
            .iter()
            .map(|a| Flag::warning("accuracy", format!("implausible percentage {a}")))
            .collect();
        Ok(CapabilityResult {
            score: Some(score),
            confidence: Some(0.6),
            dimension: Some("accuracy".to_string()),
            flags,
            recommendations: vec![],
            details: json!({ "anomalies": anomalies }),
        })
    }
}

/// Shallow structural read of the request document.
pub struct DocumentAnalysisCapability;

#[async_trait]
impl Capability for DocumentAnalysisCapability {
    fn id(&self) -> &str {
        "document-analysis"
    }

    async fn invoke(
        &self,
        request: &AnalysisRequest,
        _config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        let words = request.text.split_whitespace().count();
        let mut recommendations = Vec::new();
        if words < 10 {
            recommendations.push("provide more context for a deeper read".to_string());
        }
        Ok(CapabilityResult {
            score: Some(if words < 10 { 55.0 } else { 85.0 }),
            confidence: Some(0.4),
            dimension: Some("accuracy".to_string()),
            flags: vec![],
            recommendations,
            details: json!({ "word_count": words }),
        })
    }
}

/// Checks that the regulations named in the step config are addressed by the
/// request text.
pub struct RegulatoryComplianceCapability;

#[async_trait]
impl Capability for RegulatoryComplianceCapability {
    fn id(&self) -> &str {
        "regulatory-compliance"
    }

    async fn invoke(
        &self,
        request: &AnalysisRequest,
        config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        let regulations: Vec<String> = match config.get("regulations") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let lower = request.text.to_lowercase();
        let mut unaddressed = Vec::new();
        for regulation in &regulations {
            if !lower.contains(&regulation.to_lowercase()) {
                unaddressed.push(regulation.clone());
            }
        }
        let score = if regulations.is_empty() {
            75.0
        } else {
            let covered = regulations.len() - unaddressed.len();
            50.0 + 50.0 * covered as f64 / regulations.len() as f64
        };
        let flags = unaddressed
            .iter()
            .map(|r| Flag::warning("integrity", format!("regulation {r} not addressed")))
            .collect();
        Ok(CapabilityResult {
            score: Some(score),
            confidence: Some(0.6),
            dimension: Some("integrity".to_string()),
            flags,
            recommendations: unaddressed
                .iter()
                .map(|r| format!("document how {r} applies to this request"))
                .collect(),
            details: json!({ "regulations": regulations, "unaddressed": unaddressed }),
        })
    }
}

/// Extracts the fields named in the step config from the request payload.
/// The audit field tables are consumed through this seam only.
pub struct FieldExtractionCapability;

#[async_trait]
impl Capability for FieldExtractionCapability {
    fn id(&self) -> &str {
        "field-extraction"
    }

    async fn invoke(
        &self,
        request: &AnalysisRequest,
        config: &Value,
    ) -> Result<CapabilityResult, StepError> {
        let fields: Vec<String> = match config.get("fields") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let mut extracted = serde_json::Map::new();
        let mut flags = Vec::new();
        for field in &fields {
            let pointer = format!("/{}", field.replace('.', "/"));
            match request.payload.pointer(&pointer) {
                Some(value) => {
                    extracted.insert(field.clone(), value.clone());
                }
                None => {
                    flags.push(Flag::warning(
                        "accuracy",
                        format!("field '{field}' absent from payload"),
                    ));
                }
            }
        }
        Ok(CapabilityResult {
            score: None,
            confidence: None,
            dimension: None,
            flags,
            recommendations: vec![],
            details: Value::Object(extracted),
        })
    }
}
