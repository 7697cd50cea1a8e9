//! Step-by-step view of the decision history.

use serde::Serialize;

use crate::envelope::DecisionRecord;

/// One traversal step, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStep {
    /// 1-based position in the traversal.
    pub position: usize,
    pub node_id: Option<String>,
    pub question: Option<String>,
    pub chosen_child: Option<String>,
    /// Score with three decimals.
    pub chosen_score: Option<String>,
    /// Probability with three decimals.
    pub chosen_probability: Option<String>,
    /// Number of children that were scored at this step.
    pub option_count: usize,
    /// The service skipped scoring because only one child was plausible.
    pub deterministic: bool,
    pub human_justification: Option<String>,
}

impl HistoryStep {
    /// True when a human picked the child at this step.
    pub fn was_escalated(&self) -> bool {
        self.human_justification.is_some()
    }
}

pub fn history_steps(records: &[DecisionRecord]) -> Vec<HistoryStep> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| HistoryStep {
            position: i + 1,
            node_id: record.node_id.clone(),
            question: record.question.clone(),
            chosen_child: record.chosen_child.clone(),
            chosen_score: record.chosen_score.map(|s| format!("{s:.3}")),
            chosen_probability: record.chosen_probability.map(|p| format!("{p:.3}")),
            option_count: record.children.len(),
            deterministic: record.deterministic,
            human_justification: record.human_justification.clone(),
        })
        .collect()
}
