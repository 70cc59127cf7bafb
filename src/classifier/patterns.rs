//! Static classification tables: stopwords, multi-word phrases, vertical
//! keyword profiles, the ordered use-case pattern table, and entity regexes.
//!
//! Table order is part of the contract: the first matching use-case pattern
//! wins, and vertical profile order breaks score ties.

use std::sync::OnceLock;

use regex::Regex;

pub(crate) const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has",
    "have", "in", "is", "it", "its", "of", "on", "or", "our", "that", "the",
    "their", "this", "to", "was", "we", "were", "will", "with", "you", "your",
    "please", "can", "could", "would", "should", "any", "all",
];

/// Multi-word phrases appended to the keyword set when present in the text.
pub(crate) const PHRASES: &[&str] = &[
    "oil and gas",
    "mineral rights",
    "rate case",
    "protected health information",
    "medical records",
    "money laundering",
    "suspicious activity",
    "balance sheet",
    "interest rate",
    "force majeure",
    "intellectual property",
    "insurance claim",
    "risk assessment",
];

pub(crate) struct VerticalProfile {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// Whole-word patterns; each match adds a 0.5 bonus to the score.
    pub patterns: &'static [&'static str],
}

pub(crate) const VERTICAL_PROFILES: &[VerticalProfile] = &[
    VerticalProfile {
        name: "energy",
        keywords: &[
            "oil", "gas", "energy", "drilling", "pipeline", "lease", "mineral",
            "utility", "tariff", "wellhead", "royalty",
        ],
        patterns: &[r"\boil\b", r"\bgas\b", r"\bdrilling\b", r"\bmineral\s+rights\b"],
    },
    VerticalProfile {
        name: "healthcare",
        keywords: &[
            "patient", "medical", "hipaa", "clinical", "hospital", "health",
            "phi", "diagnosis", "provider",
        ],
        patterns: &[r"\bhipaa\b", r"\bpatient\b", r"\bclinical\b"],
    },
    VerticalProfile {
        name: "financial-services",
        keywords: &[
            "loan", "bank", "financial", "credit", "investment", "portfolio",
            "aml", "transaction", "lending", "deposit",
        ],
        patterns: &[r"\bloan\b", r"\baml\b", r"\bunderwriting\b"],
    },
    VerticalProfile {
        name: "legal",
        keywords: &[
            "contract", "agreement", "clause", "legal", "litigation",
            "liability", "indemnification", "counsel",
        ],
        patterns: &[r"\bcontract\b", r"\bclause\b", r"\blitigation\b"],
    },
    VerticalProfile {
        name: "insurance",
        keywords: &[
            "insurance", "policy", "claim", "premium", "coverage", "actuarial",
            "policyholder", "adjuster",
        ],
        patterns: &[r"\binsurance\b", r"\bpremium\b", r"\bpolicyholder\b"],
    },
];

pub(crate) struct UseCasePattern {
    pub pattern: &'static str,
    pub use_case: &'static str,
    pub vertical: &'static str,
}

/// Ordered: the first matching entry wins.
pub(crate) const USE_CASE_PATTERNS: &[UseCasePattern] = &[
    UseCasePattern {
        pattern: r"(?i)oil\s+(?:and|&)\s+gas.*\blease\b|\blease\b.*\bmineral\s+rights\b",
        use_case: "energy-oil-gas-lease",
        vertical: "energy",
    },
    UseCasePattern {
        pattern: r"(?i)\b(?:utility|tariff|rate)\s+(?:case|filing|schedule)\b",
        use_case: "energy-utility-rate-review",
        vertical: "energy",
    },
    UseCasePattern {
        pattern: r"(?i)\bhipaa\b|protected\s+health\s+information|\bphi\b",
        use_case: "healthcare-hipaa-audit",
        vertical: "healthcare",
    },
    UseCasePattern {
        pattern: r"(?i)medical\s+claims?\b|billing\s+codes?\b|\bcpt\s+code",
        use_case: "healthcare-claims-billing",
        vertical: "healthcare",
    },
    UseCasePattern {
        pattern: r"(?i)anti[\s-]?money\s+laundering|\baml\b|suspicious\s+activity",
        use_case: "financial-aml-screening",
        vertical: "financial-services",
    },
    UseCasePattern {
        pattern: r"(?i)\bloan\s+(?:application|portfolio|file|review)\b|\bunderwriting\b",
        use_case: "financial-loan-review",
        vertical: "financial-services",
    },
    UseCasePattern {
        pattern: r"(?i)\bcontract\b.*\b(?:review|clause|indemnif|renewal)",
        use_case: "legal-contract-review",
        vertical: "legal",
    },
    UseCasePattern {
        pattern: r"(?i)insurance\s+claim|claim\s+adjust|policyholder",
        use_case: "insurance-claim-review",
        vertical: "insurance",
    },
];

pub(crate) fn vertical_regexes() -> &'static [Vec<Regex>] {
    static CELL: OnceLock<Vec<Vec<Regex>>> = OnceLock::new();
    CELL.get_or_init(|| {
        VERTICAL_PROFILES
            .iter()
            .map(|profile| {
                profile
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("vertical pattern"))
                    .collect()
            })
            .collect()
    })
}

pub(crate) fn use_case_regexes() -> &'static [Regex] {
    static CELL: OnceLock<Vec<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        USE_CASE_PATTERNS
            .iter()
            .map(|entry| Regex::new(entry.pattern).expect("use-case pattern"))
            .collect()
    })
}

pub(crate) struct EntityPatterns {
    pub date: Regex,
    pub currency: Regex,
    pub percentage: Regex,
    pub organization: Regex,
    pub location: Regex,
}

pub(crate) fn entity_patterns() -> &'static EntityPatterns {
    static CELL: OnceLock<EntityPatterns> = OnceLock::new();
    CELL.get_or_init(|| EntityPatterns {
        date: Regex::new(
            r"\b\d{4}-\d{2}-\d{2}\b|\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4}\b",
        )
        .expect("date pattern"),
        currency: Regex::new(r"\$\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:thousand|million|billion))?")
            .expect("currency pattern"),
        percentage: Regex::new(r"\b\d+(?:\.\d+)?\s?%").expect("percentage pattern"),
        organization: Regex::new(
            r"\b[A-Z][A-Za-z0-9&'-]*(?:\s+[A-Z][A-Za-z0-9&'-]*)*\s+(?:Inc|LLC|Corp|Company)\b\.?",
        )
        .expect("organization pattern"),
        location: Regex::new(r"\b[A-Z][a-z]+(?:\s[A-Z][a-z]+)?,\s[A-Z]{2}\b")
            .expect("location pattern"),
    })
}
