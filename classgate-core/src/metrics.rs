//! Per-session process metrics.
//!
//! Derived from the terminal decision history; an escalation in progress
//! only contributes to the escalation count.

use serde::Serialize;

use crate::envelope::ResponseEnvelope;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMetrics {
    /// Steps in the terminal decision history.
    pub steps: usize,
    /// Depth of the final node, once the traversal is terminal.
    pub final_depth: Option<usize>,
    /// Escalations observed since the last submission.
    pub escalations: u32,
    /// Mean Shannon entropy (bits) over steps that recorded child
    /// probabilities.
    pub mean_entropy: Option<f64>,
}

impl SessionMetrics {
    pub fn collect(envelope: Option<&ResponseEnvelope>, escalations: u32) -> Self {
        let Some(outcome) = envelope.and_then(ResponseEnvelope::final_outcome) else {
            return Self {
                escalations,
                ..Default::default()
            };
        };

        let entropies: Vec<f64> = outcome
            .decision_history
            .iter()
            .filter(|record| !record.children.is_empty())
            .map(|record| {
                let probabilities: Vec<f64> =
                    record.children.iter().map(|c| c.probability).collect();
                shannon_entropy(&probabilities)
            })
            .collect();

        let mean_entropy = if entropies.is_empty() {
            None
        } else {
            Some(entropies.iter().sum::<f64>() / entropies.len() as f64)
        };

        let steps = outcome.decision_history.len();
        Self {
            steps,
            final_depth: Some(steps),
            escalations,
            mean_entropy,
        }
    }

    /// Mean entropy with three decimals, or "—" when unknown.
    pub fn mean_entropy_display(&self) -> String {
        self.mean_entropy
            .map(|e| format!("{e:.3}"))
            .unwrap_or_else(|| "—".to_string())
    }
}

/// Shannon entropy in bits. Non-positive probabilities contribute nothing.
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    let sum: f64 = probabilities
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| p * p.log2())
        .sum();
    // Avoid -0.0 for a single certain child.
    if sum == 0.0 { 0.0 } else { -sum }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{DecisionOption, DecisionRecord, FinalOutcome, OpaqueState, ResultFormat};
    use serde_json::json;

    fn record(probabilities: &[f64]) -> DecisionRecord {
        DecisionRecord {
            children: probabilities
                .iter()
                .enumerate()
                .map(|(i, p)| DecisionOption {
                    id: format!("1.{i}"),
                    score: *p,
                    probability: *p,
                    rationale: String::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert_eq!(shannon_entropy(&[1.0]), 0.0);
        assert!((shannon_entropy(&[0.5, 0.5]) - 1.0).abs() < 1e-12);
        assert!((shannon_entropy(&[0.25; 4]) - 2.0).abs() < 1e-12);
        assert_eq!(shannon_entropy(&[0.0, 1.0]), 0.0);
        assert_eq!(shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn test_collect_from_terminal() {
        let envelope = ResponseEnvelope::Terminal {
            outcome: FinalOutcome {
                node_id: "1.2.3".to_string(),
                log_probability: -0.7,
                decision_history: vec![record(&[0.5, 0.5]), record(&[1.0]), record(&[])],
            },
            format: ResultFormat::Legacy,
            state: OpaqueState::from_value(&json!({})).unwrap(),
        };

        let metrics = SessionMetrics::collect(Some(&envelope), 1);
        assert_eq!(metrics.steps, 3);
        assert_eq!(metrics.final_depth, Some(3));
        assert_eq!(metrics.escalations, 1);
        // (1.0 + 0.0) / 2 steps with probabilities
        assert!((metrics.mean_entropy.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(metrics.mean_entropy_display(), "0.500");
    }

    #[test]
    fn test_collect_without_terminal() {
        let metrics = SessionMetrics::collect(None, 2);
        assert_eq!(metrics.steps, 0);
        assert_eq!(metrics.final_depth, None);
        assert_eq!(metrics.escalations, 2);
        assert_eq!(metrics.mean_entropy_display(), "—");
    }
}
