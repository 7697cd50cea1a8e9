//! Escalation dialog view model.
//!
//! Built from the escalation metadata; options keep the server's order and
//! the first one is always the recommended choice.

use serde::Serialize;

use crate::envelope::{DecisionOption, HitlMetadata};

/// Qualitative label for an option's probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbabilityTier {
    /// 50% and above
    High,
    /// 25% up to (not including) 50%
    Medium,
    /// Below 25%
    Low,
}

/// Visual weight of a tier. Each tier maps to a distinct emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Emphasis {
    Strong,
    Normal,
    Subdued,
}

impl ProbabilityTier {
    /// Tier of a probability in `[0, 1]`, compared as a percentage.
    pub fn from_probability(probability: f64) -> Self {
        let percent = probability * 100.0;
        if percent >= 50.0 {
            Self::High
        } else if percent >= 25.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn emphasis(&self) -> Emphasis {
        match self {
            Self::High => Emphasis::Strong,
            Self::Medium => Emphasis::Normal,
            Self::Low => Emphasis::Subdued,
        }
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    /// Zero-based position in server order.
    pub index: usize,
    pub id: String,
    pub rationale: String,
    pub score: f64,
    pub probability: f64,
    /// Probability as a percentage with one decimal, e.g. "60.0".
    pub probability_percent: String,
    pub tier: ProbabilityTier,
    pub recommended: bool,
}

impl OptionView {
    fn new(index: usize, option: &DecisionOption) -> Self {
        Self {
            index,
            id: option.id.clone(),
            rationale: option.rationale.clone(),
            score: option.score,
            probability: option.probability,
            probability_percent: format!("{:.1}", option.probability * 100.0),
            tier: ProbabilityTier::from_probability(option.probability),
            recommended: index == 0,
        }
    }
}

/// Everything the dialog displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationDialog {
    pub node_id: String,
    pub question: String,
    pub depth: u32,
    /// Local entropy with three decimals, e.g. "0.920".
    pub entropy: String,
    pub options: Vec<OptionView>,
    /// Current content of the justification input.
    pub justification: String,
}

impl EscalationDialog {
    pub fn new(metadata: &HitlMetadata, justification: &str) -> Self {
        Self {
            node_id: metadata.node_id.clone(),
            question: metadata.question.clone(),
            depth: metadata.depth,
            entropy: format!("{:.3}", metadata.local_entropy),
            options: metadata
                .children
                .iter()
                .enumerate()
                .map(|(index, option)| OptionView::new(index, option))
                .collect(),
            justification: justification.to_string(),
        }
    }

    pub fn option(&self, id: &str) -> Option<&OptionView> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Resolves user input that is either an option id or a 1-based
    /// position in the list.
    pub fn resolve_choice(&self, input: &str) -> Option<&OptionView> {
        let input = input.trim();
        if let Some(option) = self.option(input) {
            return Some(option);
        }
        input
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .and_then(|n| self.options.get(n - 1))
    }

    pub fn recommended(&self) -> Option<&OptionView> {
        self.options.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, probability: f64) -> DecisionOption {
        DecisionOption {
            id: id.to_string(),
            score: probability,
            probability,
            rationale: format!("why {id}"),
        }
    }

    fn metadata() -> HitlMetadata {
        HitlMetadata {
            node_id: "1".to_string(),
            question: "Which domain?".to_string(),
            depth: 1,
            local_entropy: 0.92,
            children: vec![option("1.2", 0.6), option("1.1", 0.3), option("1.3", 0.1)],
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ProbabilityTier::from_probability(0.50), ProbabilityTier::High);
        assert_eq!(ProbabilityTier::from_probability(0.499), ProbabilityTier::Medium);
        assert_eq!(ProbabilityTier::from_probability(0.25), ProbabilityTier::Medium);
        assert_eq!(ProbabilityTier::from_probability(0.249), ProbabilityTier::Low);
        assert_eq!(ProbabilityTier::from_probability(1.0), ProbabilityTier::High);
        assert_eq!(ProbabilityTier::from_probability(0.0), ProbabilityTier::Low);
    }

    #[test]
    fn test_tiers_have_distinct_emphasis() {
        let tiers = [
            ProbabilityTier::High,
            ProbabilityTier::Medium,
            ProbabilityTier::Low,
        ];
        assert_ne!(tiers[0].emphasis(), tiers[1].emphasis());
        assert_ne!(tiers[1].emphasis(), tiers[2].emphasis());
        assert_ne!(tiers[0].emphasis(), tiers[2].emphasis());
    }

    #[test]
    fn test_dialog_keeps_server_order() {
        let dialog = EscalationDialog::new(&metadata(), "");
        let ids: Vec<_> = dialog.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1.2", "1.1", "1.3"]);

        assert!(dialog.options[0].recommended);
        assert!(dialog.options[1..].iter().all(|o| !o.recommended));
        assert_eq!(dialog.entropy, "0.920");
        assert_eq!(dialog.options[0].probability_percent, "60.0");
        assert_eq!(dialog.options[0].tier.label(), "High");
        assert_eq!(dialog.options[1].tier.label(), "Medium");
        assert_eq!(dialog.options[2].tier.label(), "Low");
    }

    #[test]
    fn test_recommended_is_first_even_if_not_most_likely() {
        let mut metadata = metadata();
        metadata.children = vec![option("a", 0.2), option("b", 0.7)];
        let dialog = EscalationDialog::new(&metadata, "");
        assert_eq!(dialog.recommended().unwrap().id, "a");
    }

    #[test]
    fn test_resolve_choice() {
        let dialog = EscalationDialog::new(&metadata(), "");
        assert_eq!(dialog.resolve_choice("1.1").unwrap().id, "1.1");
        assert_eq!(dialog.resolve_choice(" 3 ").unwrap().id, "1.3");
        assert_eq!(dialog.resolve_choice("1").unwrap().id, "1.2");
        assert!(dialog.resolve_choice("0").is_none());
        assert!(dialog.resolve_choice("4").is_none());
        assert!(dialog.resolve_choice("x").is_none());
    }
}
