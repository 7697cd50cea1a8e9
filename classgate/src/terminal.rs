//! Plain-text rendering of the core view models.
//!
//! Every function returns a `String`; callers decide where it goes.

use std::fmt::Write as _;

use classgate_core::dialog::Emphasis;
use classgate_core::render::confidence::level_description;
use classgate_core::render::history::HistoryStep;
use classgate_core::render::legacy::LegacyView;
use classgate_core::render::{FormattedView, ResultView};
use classgate_core::{EscalationDialog, OptionView, SessionMetrics};

// ─────────────────────────────────────────────────────────────────────────────
// Escalation Dialog
// ─────────────────────────────────────────────────────────────────────────────

pub fn render_dialog(dialog: &EscalationDialog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Human decision required at node {} (depth {})",
        dialog.node_id, dialog.depth
    );
    if !dialog.question.is_empty() {
        let _ = writeln!(out, "{}", dialog.question);
    }
    let _ = writeln!(out, "Local entropy: {}", dialog.entropy);
    out.push('\n');
    for option in &dialog.options {
        push_option(&mut out, option);
    }
    out
}

fn push_option(out: &mut String, option: &OptionView) {
    let _ = write!(
        out,
        "  [{}] {}  {}%  {}",
        option.index + 1,
        option.id,
        option.probability_percent,
        tier_badge(option)
    );
    if option.recommended {
        out.push_str("  (recommended)");
    }
    out.push('\n');
    if !option.rationale.is_empty() {
        let _ = writeln!(out, "      {}", option.rationale);
    }
}

fn tier_badge(option: &OptionView) -> String {
    let label = option.tier.label();
    match option.tier.emphasis() {
        Emphasis::Strong => format!("[{}]", label.to_uppercase()),
        Emphasis::Normal => format!("[{label}]"),
        Emphasis::Subdued => format!("({})", label.to_lowercase()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result
// ─────────────────────────────────────────────────────────────────────────────

pub fn render_result(view: &ResultView) -> String {
    match view {
        ResultView::Formatted(formatted) => render_formatted(formatted),
        ResultView::Legacy(legacy) => render_legacy(legacy),
        ResultView::Empty => "No result.\n".to_string(),
    }
}

fn render_formatted(view: &FormattedView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Class: {}", view.class_name);
    let _ = writeln!(out, "Occurrence type: {}", view.occurrence_type);
    if let Some(confidence) = &view.confidence {
        let _ = writeln!(out, "Confidence: {} ({})", confidence.label, confidence.level);
    }
    if let Some(paragraphs) = &view.justification {
        out.push_str("\nTechnical justification:\n");
        let _ = writeln!(out, "  {}", paragraphs.join("\n\n  "));
    }
    if let Some(summary) = &view.summary {
        out.push_str("\nTechnical summary:\n");
        let _ = writeln!(out, "{}", summary.to_plain_text());
    }
    out
}

fn render_legacy(view: &LegacyView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Class: {}", view.class_name);
    let _ = writeln!(out, "Node: {}", view.node_id);
    let _ = writeln!(
        out,
        "Confidence: {}. {}",
        view.confidence.label,
        level_description(view.confidence.level)
    );
    let _ = writeln!(out, "Decisions: {}", view.decision_count);
    if !view.history.is_empty() {
        out.push_str("\nDecision path:\n");
        for step in &view.history {
            push_step(&mut out, step);
        }
    }
    out
}

fn push_step(out: &mut String, step: &HistoryStep) {
    let node = step.node_id.as_deref().unwrap_or("?");
    let chosen = step.chosen_child.as_deref().unwrap_or("?");
    let _ = write!(out, "  {}. {node} -> {chosen}", step.position);
    if step.deterministic {
        out.push_str(" (deterministic)");
    } else if let Some(p) = &step.chosen_probability {
        let _ = write!(out, " (p={p})");
    }
    out.push('\n');
    if let Some(justification) = &step.human_justification {
        let _ = writeln!(out, "     human: {justification}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metrics
// ─────────────────────────────────────────────────────────────────────────────

pub fn render_metrics(metrics: &SessionMetrics) -> String {
    let depth = metrics
        .final_depth
        .map(|d| d.to_string())
        .unwrap_or_else(|| "—".to_string());
    format!(
        "Steps: {} | Final depth: {depth} | Escalations: {} | Mean entropy: {}\n",
        metrics.steps,
        metrics.escalations,
        metrics.mean_entropy_display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use classgate_core::envelope::parse_envelope;
    use classgate_core::select_view;
    use serde_json::json;

    fn dialog() -> EscalationDialog {
        let envelope = parse_envelope(
            json!({
                "hitl_required": true,
                "hitl_metadata": {
                    "node_id": "1",
                    "pergunta": "Which domain?",
                    "depth": 1,
                    "entropia_local": 0.92,
                    "children": [
                        {"id": "1.2", "score": 0.8, "prob": 0.6, "justificativa": "oil spill"},
                        {"id": "1.1", "score": 0.4, "prob": 0.3},
                        {"id": "1.3", "score": 0.1, "prob": 0.1}
                    ]
                },
                "state": {"k": 1}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        EscalationDialog::new(envelope.hitl_metadata().unwrap(), "")
    }

    #[test]
    fn test_render_dialog() {
        let text = render_dialog(&dialog());
        assert!(text.starts_with("Human decision required at node 1 (depth 1)\n"));
        assert!(text.contains("Local entropy: 0.920"));
        assert!(text.contains("  [1] 1.2  60.0%  [HIGH]  (recommended)\n      oil spill\n"));
        assert!(text.contains("  [2] 1.1  30.0%  [Medium]\n"));
        assert!(text.contains("  [3] 1.3  10.0%  (low)\n"));
    }

    #[test]
    fn test_render_legacy_result() {
        let envelope = parse_envelope(
            json!({
                "hitl_required": false,
                "final": {
                    "node_id": "1.2.3",
                    "log_prob": -0.4,
                    "historico": [
                        {"node_id": "1", "chosen_child": "1.2", "chosen_prob": 0.6,
                         "justificativa_humana": "visible sheen"},
                        {"node_id": "1.2", "chosen_child": "1.2.3", "colapso_ontologico": true}
                    ]
                },
                "state": {}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        let text = render_result(&select_view(Some(&envelope)));
        assert!(text.starts_with("Class: Meio Ambiente\nNode: 1.2.3\nConfidence: High."));
        assert!(text.contains("Decisions: 2"));
        assert!(text.contains("  1. 1 -> 1.2 (p=0.600)\n     human: visible sheen\n"));
        assert!(text.contains("  2. 1.2 -> 1.2.3 (deterministic)\n"));
    }

    #[test]
    fn test_render_formatted_result() {
        let envelope = parse_envelope(
            json!({
                "hitl_required": false,
                "final": {"node_id": "1.2.3", "log_prob": -0.4, "historico": []},
                "resultado_formatado": {
                    "classe": "Environment",
                    "tipo_ocorrencia": "Oil leak",
                    "justificativa_tecnica": "First.\n\nSecond.",
                    "confianca": {"nivel": "alta", "nivel_display": "Alta"},
                    "resumo_tecnico": "## Summary\n- **Class**: Environment"
                },
                "state": {}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        let text = render_result(&select_view(Some(&envelope)));
        assert_eq!(
            text,
            "Class: Environment\n\
             Occurrence type: Oil leak\n\
             Confidence: Alta (high)\n\
             \n\
             Technical justification:\n  First.\n\n  Second.\n\
             \n\
             Technical summary:\nSUMMARY\n  • Class: Environment\n"
        );
    }

    #[test]
    fn test_render_empty_and_metrics() {
        assert_eq!(render_result(&ResultView::Empty), "No result.\n");
        let metrics = SessionMetrics {
            escalations: 1,
            ..Default::default()
        };
        assert_eq!(
            render_metrics(&metrics),
            "Steps: 0 | Final depth: — | Escalations: 1 | Mean entropy: —\n"
        );
    }
}
