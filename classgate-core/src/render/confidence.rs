//! Confidence derived from a path's log-probability.
//!
//! Only used by the legacy view; formatted results carry the service's own
//! confidence block.

use serde::Serialize;

use crate::envelope::ConfidenceLevel;

/// Log-probabilities at or above this are high confidence.
pub const HIGH_CONFIDENCE_LOG_PROB: f64 = -1.0;
/// Log-probabilities at or above this (and below high) are moderate.
pub const MODERATE_CONFIDENCE_LOG_PROB: f64 = -2.5;

/// Confidence as shown to the reviewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceView {
    pub level: ConfidenceLevel,
    pub label: String,
}

impl ConfidenceView {
    pub fn from_log_probability(log_probability: f64) -> Self {
        let level = level_from_log_probability(log_probability);
        Self {
            level,
            label: level_label(level).to_string(),
        }
    }
}

pub fn level_from_log_probability(log_probability: f64) -> ConfidenceLevel {
    if log_probability >= HIGH_CONFIDENCE_LOG_PROB {
        ConfidenceLevel::High
    } else if log_probability >= MODERATE_CONFIDENCE_LOG_PROB {
        ConfidenceLevel::Moderate
    } else {
        ConfidenceLevel::Low
    }
}

pub fn level_label(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "High",
        ConfidenceLevel::Moderate => "Moderate",
        ConfidenceLevel::Low => "Low",
    }
}

/// One-sentence explanation of a level for the reviewer.
pub fn level_description(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => {
            "The decision path is highly consistent with the normative criteria."
        }
        ConfidenceLevel::Moderate => {
            "The decision follows the most consistent path among the criteria analysed."
        }
        ConfidenceLevel::Low => "Some uncertainty was found along the path. Review is recommended.",
    }
}
