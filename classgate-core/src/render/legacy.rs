//! Legacy result view, used when the service sends no formatted result.

use serde::Serialize;

use super::confidence::ConfidenceView;
use super::history::{HistoryStep, history_steps};
use crate::envelope::FinalOutcome;

/// Best-effort class names for the top-level branches of the tree.
const CLASS_PREFIXES: &[(&str, &str)] = &[
    ("1.1", "Segurança do Trabalho"),
    ("1.2", "Meio Ambiente"),
    ("1.3", "Saúde Ocupacional"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyView {
    pub class_name: String,
    pub node_id: String,
    pub decision_count: usize,
    pub confidence: ConfidenceView,
    pub history: Vec<HistoryStep>,
}

impl LegacyView {
    pub fn new(outcome: &FinalOutcome) -> Self {
        Self {
            class_name: legacy_class_name(&outcome.node_id),
            node_id: outcome.node_id.clone(),
            decision_count: outcome.decision_history.len(),
            confidence: ConfidenceView::from_log_probability(outcome.log_probability),
            history: history_steps(&outcome.decision_history),
        }
    }
}

/// Class name guessed from the node id prefix, or the node id itself.
///
/// A prefix only matches on a segment boundary: `1.10` is not under `1.1`.
pub fn legacy_class_name(node_id: &str) -> String {
    CLASS_PREFIXES
        .iter()
        .find(|(prefix, _)| {
            node_id
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| node_id.to_string())
}
