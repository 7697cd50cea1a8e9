//! Result view selection.
//!
//! Given the current envelope (or none), exactly one view is shown:
//!
//! | envelope                           | view        |
//! |------------------------------------|-------------|
//! | none                               | `Empty`     |
//! | escalation                         | `Empty`     |
//! | terminal with a formatted result   | `Formatted` |
//! | terminal without                   | `Legacy`    |
//!
//! A formatted result always wins, even if legacy fields are also present.

pub mod confidence;
pub mod history;
pub mod legacy;
pub mod markup;

use serde::Serialize;

use crate::envelope::{FormattedResult, ResponseEnvelope, ResultFormat};
use confidence::ConfidenceView;
use legacy::LegacyView;
use markup::MarkupDocument;

/// The one result view to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultView {
    Formatted(FormattedView),
    Legacy(LegacyView),
    Empty,
}

/// View of a service-formatted result. Each optional part renders on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedView {
    pub class_name: String,
    pub occurrence_type: String,
    /// Technical justification split into paragraphs.
    pub justification: Option<Vec<String>>,
    pub confidence: Option<ConfidenceView>,
    #[serde(skip)]
    pub summary: Option<MarkupDocument>,
}

impl FormattedView {
    pub fn new(result: &FormattedResult) -> Self {
        Self {
            class_name: result.class_name.clone(),
            occurrence_type: result.occurrence_type.clone(),
            justification: result
                .technical_justification
                .as_deref()
                .map(paragraphs)
                .filter(|p| !p.is_empty()),
            confidence: result.confidence.as_ref().map(|c| ConfidenceView {
                level: c.level,
                label: c.display_label.clone(),
            }),
            summary: result
                .technical_summary
                .as_deref()
                .map(MarkupDocument::parse),
        }
    }

    /// Summary as an escaped HTML fragment.
    pub fn summary_html(&self) -> Option<String> {
        self.summary.as_ref().map(MarkupDocument::to_html)
    }
}

/// Selects the view for `envelope`.
pub fn select_view(envelope: Option<&ResponseEnvelope>) -> ResultView {
    match envelope {
        None | Some(ResponseEnvelope::Escalation { .. }) => ResultView::Empty,
        Some(ResponseEnvelope::Terminal {
            format: ResultFormat::Formatted(result),
            ..
        }) => ResultView::Formatted(FormattedView::new(result)),
        Some(ResponseEnvelope::Terminal {
            outcome,
            format: ResultFormat::Legacy,
            ..
        }) => ResultView::Legacy(LegacyView::new(outcome)),
    }
}

/// Splits free text into paragraphs on blank lines. Lines inside a
/// paragraph are joined with a single space.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{
        Confidence, ConfidenceLevel, DecisionOption, FinalOutcome, HitlMetadata, OpaqueState,
    };
    use serde_json::json;

    fn outcome() -> FinalOutcome {
        FinalOutcome {
            node_id: "1.2.3".to_string(),
            log_probability: -0.4,
            decision_history: Vec::new(),
        }
    }

    fn formatted() -> FormattedResult {
        FormattedResult {
            class_name: "Environment".to_string(),
            occurrence_type: "Oil leak".to_string(),
            technical_justification: Some("First line\ncontinues.\n\n\nSecond.".to_string()),
            confidence: Some(Confidence {
                level: ConfidenceLevel::High,
                display_label: "Alta".to_string(),
            }),
            technical_summary: Some("## Summary\n<b>raw</b>".to_string()),
        }
    }

    #[test]
    fn test_no_envelope_is_empty() {
        assert_eq!(select_view(None), ResultView::Empty);
    }

    #[test]
    fn test_escalation_is_empty() {
        let envelope = ResponseEnvelope::Escalation {
            metadata: HitlMetadata {
                node_id: "1".to_string(),
                question: String::new(),
                depth: 1,
                local_entropy: 0.5,
                children: vec![DecisionOption {
                    id: "1.1".to_string(),
                    score: 0.5,
                    probability: 0.5,
                    rationale: String::new(),
                }],
            },
            state: OpaqueState::from_value(&json!({})).unwrap(),
        };
        assert_eq!(select_view(Some(&envelope)), ResultView::Empty);
    }

    #[test]
    fn test_formatted_takes_precedence() {
        let envelope = ResponseEnvelope::Terminal {
            outcome: outcome(),
            format: ResultFormat::Formatted(formatted()),
            state: OpaqueState::from_value(&json!({})).unwrap(),
        };
        let ResultView::Formatted(view) = select_view(Some(&envelope)) else {
            panic!("expected formatted view");
        };
        assert_eq!(view.class_name, "Environment");
        assert_eq!(
            view.justification,
            Some(vec!["First line continues.".to_string(), "Second.".to_string()])
        );
        assert_eq!(view.confidence.as_ref().unwrap().label, "Alta");
        assert_eq!(
            view.summary_html().unwrap(),
            "<h4>Summary</h4>&lt;b&gt;raw&lt;/b&gt;"
        );
    }

    #[test]
    fn test_optional_parts_render_independently() {
        let mut result = formatted();
        result.technical_justification = None;
        result.technical_summary = None;
        let view = FormattedView::new(&result);
        assert!(view.justification.is_none());
        assert!(view.summary.is_none());
        assert!(view.confidence.is_some());
    }

    #[test]
    fn test_terminal_without_formatted_is_legacy() {
        let envelope = ResponseEnvelope::Terminal {
            outcome: outcome(),
            format: ResultFormat::Legacy,
            state: OpaqueState::from_value(&json!({})).unwrap(),
        };
        let ResultView::Legacy(view) = select_view(Some(&envelope)) else {
            panic!("expected legacy view");
        };
        assert_eq!(view.class_name, "Meio Ambiente");
        assert_eq!(view.confidence.level, ConfidenceLevel::High);
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(paragraphs("a\n\nb\n  \nc d"), vec!["a", "b", "c d"]);
        assert!(paragraphs("\n \n").is_empty());
    }
}
