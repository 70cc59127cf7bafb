//! Heuristic prompt classifier: free text in, vertical / use case / keywords /
//! entities / intent / confidence out.
//!
//! Classification is deterministic given the text and the static tables in
//! [`patterns`]; no model calls are involved.

mod patterns;

use serde::{Deserialize, Serialize};

use patterns::{
    entity_patterns, use_case_regexes, vertical_regexes, PHRASES, STOPWORDS,
    USE_CASE_PATTERNS, VERTICAL_PROFILES,
};

/// Kind of entity recognized by the fixed extraction regexes.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Date,
    Currency,
    Percentage,
    Organization,
    Location,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub value: String,
}

/// Output of [`PromptClassifier::classify`]. Produced once per request and
/// immutable afterwards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub vertical: Option<String>,
    pub use_case: Option<String>,
    /// Deduplicated, first-seen order.
    pub keywords: Vec<String>,
    pub entities: Vec<Entity>,
    pub intent: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// Rule-based classifier over the static pattern tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptClassifier;

impl PromptClassifier {
    pub fn new() -> Self {
        PromptClassifier
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lower = text.to_lowercase();
        let keywords = extract_keywords(&lower);

        let vertical_match = score_verticals(&lower);
        let mut confidence = vertical_match
            .as_ref()
            .map(|m| m.confidence)
            .unwrap_or(0.0);
        let mut vertical = vertical_match.map(|m| m.name.to_string());

        let use_case = match_use_case(text);
        if let Some(matched) = &use_case {
            // A pattern hit is strong evidence; never lowers confidence.
            confidence = confidence.max(0.8);
            if vertical.is_none() {
                vertical = Some(matched.vertical.to_string());
            }
        }
        let use_case = use_case.map(|m| m.use_case.to_string());

        let entities = extract_entities(text);
        let intent = classify_intent(&lower, &keywords);

        confidence = match (vertical.is_some(), use_case.is_some()) {
            (true, true) => confidence.max(0.7),
            (true, false) | (false, true) => confidence.max(0.5),
            (false, false) => confidence.min(0.3),
        };

        ClassificationResult {
            vertical,
            use_case,
            keywords,
            entities,
            intent,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

struct VerticalMatch {
    name: &'static str,
    confidence: f64,
}

struct UseCaseMatch {
    use_case: &'static str,
    vertical: &'static str,
}

fn extract_keywords(lower: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    for token in lower.split(|c: char| !c.is_alphanumeric()) {
        if token.len() < 3 || STOPWORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    for phrase in PHRASES {
        if lower.contains(phrase) && !keywords.iter().any(|k| k == phrase) {
            keywords.push((*phrase).to_string());
        }
    }
    keywords
}

/// Score every vertical profile; the max wins, profile order breaks ties.
fn score_verticals(lower: &str) -> Option<VerticalMatch> {
    let regexes = vertical_regexes();
    let mut best: Option<(usize, f64)> = None;

    for (idx, profile) in VERTICAL_PROFILES.iter().enumerate() {
        let mut score = 0.0;
        for keyword in profile.keywords {
            score += lower.matches(keyword).count() as f64;
        }
        for pattern in &regexes[idx] {
            if pattern.is_match(lower) {
                score += 0.5;
            }
        }
        if score > 0.0 && best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((idx, score));
        }
    }

    best.map(|(idx, score)| VerticalMatch {
        name: VERTICAL_PROFILES[idx].name,
        confidence: (score / 5.0).min(1.0),
    })
}

/// First matching entry of the ordered use-case table wins.
fn match_use_case(text: &str) -> Option<UseCaseMatch> {
    for (idx, regex) in use_case_regexes().iter().enumerate() {
        if regex.is_match(text) {
            let entry = &USE_CASE_PATTERNS[idx];
            return Some(UseCaseMatch {
                use_case: entry.use_case,
                vertical: entry.vertical,
            });
        }
    }
    None
}

fn extract_entities(text: &str) -> Vec<Entity> {
    let patterns = entity_patterns();
    let mut entities = Vec::new();
    let mut push_all = |entity_type: EntityType, regex: &regex::Regex| {
        for m in regex.find_iter(text) {
            entities.push(Entity {
                entity_type,
                value: m.as_str().to_string(),
            });
        }
    };
    push_all(EntityType::Date, &patterns.date);
    push_all(EntityType::Currency, &patterns.currency);
    push_all(EntityType::Percentage, &patterns.percentage);
    push_all(EntityType::Organization, &patterns.organization);
    push_all(EntityType::Location, &patterns.location);
    entities
}

/// Verb cues first (in table order), then keyword fallback.
fn classify_intent(lower: &str, keywords: &[String]) -> String {
    const VERB_CUES: &[(&[&str], &str)] = &[
        (&["review", "analyze", "analyse"], "review"),
        (&["validate", "verify"], "validation"),
        (&["comply", "compliance"], "compliance"),
        (&["calculate", "compute"], "calculation"),
        (&["compare", "comparison"], "comparison"),
        (&["risk"], "risk-assessment"),
    ];
    for (cues, intent) in VERB_CUES {
        if cues.iter().any(|cue| lower.contains(cue)) {
            return (*intent).to_string();
        }
    }

    const KEYWORD_FALLBACK: &[(&str, &str)] = &[
        ("audit", "audit"),
        ("report", "reporting"),
        ("contract", "contract-review"),
    ];
    for (keyword, intent) in KEYWORD_FALLBACK {
        if keywords.iter().any(|k| k.contains(keyword)) {
            return (*intent).to_string();
        }
    }

    "general-analysis".to_string()
}
