//! Trust-score fusion: folds per-step capability results into overall
//! Security/Integrity/Accuracy scores.
//!
//! Pure and deterministic. Confidence-weighted blending lets high-confidence
//! findings dominate while low-confidence ones nudge gently; critical flags
//! carry a flat penalty that blending cannot wash out.

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityResult, FlagSeverity};

/// Default blend weight for results that carry no confidence.
const DEFAULT_CONFIDENCE: f64 = 0.5;
/// Flat deduction per critical-severity flag.
const CRITICAL_FLAG_PENALTY: f64 = 5.0;

/// Baseline scores a use case starts from before any findings are folded in.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BaseScores {
    pub security: f64,
    pub integrity: f64,
    pub accuracy: f64,
}

impl Default for BaseScores {
    fn default() -> Self {
        BaseScores {
            security: 70.0,
            integrity: 70.0,
            accuracy: 70.0,
        }
    }
}

/// Final per-dimension trust scores, clamped to `[0, 100]`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatedScore {
    pub security: u8,
    pub integrity: u8,
    pub accuracy: u8,
}

/// Fold step results into an [`AggregatedScore`].
///
/// Results blend in declaration order:
/// `new = old * (1 - confidence) + score * confidence`. Critical-flag
/// penalties apply after all blending, so a later blend cannot dilute them;
/// clamping happens last.
pub fn aggregate<'a, I>(base: &BaseScores, results: I) -> AggregatedScore
where
    I: IntoIterator<Item = &'a CapabilityResult> + Clone,
{
    let mut security = base.security;
    let mut integrity = base.integrity;
    let mut accuracy = base.accuracy;

    for result in results.clone() {
        let (Some(dimension), Some(score)) = (result.dimension.as_deref(), result.score) else {
            continue;
        };
        let confidence = result.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0);
        let blend = |old: f64| old * (1.0 - confidence) + score * confidence;
        match dimension {
            "security" => security = blend(security),
            "integrity" => integrity = blend(integrity),
            "accuracy" => accuracy = blend(accuracy),
            _ => {}
        }
    }

    for result in results {
        for flag in &result.flags {
            if flag.severity != FlagSeverity::Critical {
                continue;
            }
            match flag.category.as_str() {
                "security" => security -= CRITICAL_FLAG_PENALTY,
                "integrity" => integrity -= CRITICAL_FLAG_PENALTY,
                "accuracy" => accuracy -= CRITICAL_FLAG_PENALTY,
                _ => {}
            }
        }
    }

    AggregatedScore {
        security: clamp_score(security),
        integrity: clamp_score(integrity),
        accuracy: clamp_score(accuracy),
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
