//! Drives one session from submission to a terminal status.
//!
//! Escalations are answered by a [`DecisionSource`]: either the values
//! passed with `--select`, or a prompt on the terminal.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use classgate_core::{
    ClassificationSession, ClassifyError, EscalationDialog, SessionController, SessionStatus,
};
use tracing::info;

use crate::error::CliError;
use crate::terminal::render_dialog;

/// The answer to one escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub option_id: String,
    /// Blank means "use the configured default".
    pub justification: String,
}

/// Something that can answer an escalation dialog.
pub trait DecisionSource {
    fn decide(&mut self, dialog: &EscalationDialog) -> Result<Decision, CliError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted Decisions
// ─────────────────────────────────────────────────────────────────────────────

/// Answers escalations from a fixed list, in order.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    selections: VecDeque<String>,
    justification: Option<String>,
}

impl ScriptedDecisions {
    pub fn new(selections: impl IntoIterator<Item = String>, justification: Option<String>) -> Self {
        Self {
            selections: selections.into_iter().collect(),
            justification,
        }
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&mut self, dialog: &EscalationDialog) -> Result<Decision, CliError> {
        let input = self
            .selections
            .pop_front()
            .ok_or_else(|| CliError::SelectionRequired {
                node_id: dialog.node_id.clone(),
            })?;

        let option = dialog
            .resolve_choice(&input)
            .ok_or_else(|| CliError::UnknownChoice {
                input: input.clone(),
                node_id: dialog.node_id.clone(),
            })?;

        info!(
            node_id = %dialog.node_id,
            option_id = %option.id,
            "Answering escalation from --select"
        );
        Ok(Decision {
            option_id: option.id.clone(),
            justification: self.justification.clone().unwrap_or_default(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interactive Prompt
// ─────────────────────────────────────────────────────────────────────────────

/// Shows the dialog and reads the answer line by line.
///
/// An empty option line picks the recommended option. End of input before an
/// answer is treated as "no decision available".
pub struct PromptDecisions<R, W> {
    input: R,
    output: W,
    justification: Option<String>,
}

impl<R: BufRead, W: Write> PromptDecisions<R, W> {
    /// `justification`, when set, is used for every answer instead of asking.
    pub fn new(input: R, output: W, justification: Option<String>) -> Self {
        Self {
            input,
            output,
            justification,
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> DecisionSource for PromptDecisions<R, W> {
    fn decide(&mut self, dialog: &EscalationDialog) -> Result<Decision, CliError> {
        write!(self.output, "\n{}", render_dialog(dialog))?;

        let option_id = loop {
            write!(
                self.output,
                "Option [1-{}, or id; Enter for recommended]: ",
                dialog.options.len()
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Err(CliError::SelectionRequired {
                    node_id: dialog.node_id.clone(),
                });
            };
            let chosen = if line.is_empty() {
                dialog.recommended()
            } else {
                dialog.resolve_choice(&line)
            };
            match chosen {
                Some(option) => break option.id.clone(),
                None => writeln!(self.output, "'{line}' is not one of the options.")?,
            }
        };

        let justification = match &self.justification {
            Some(text) => text.clone(),
            None => {
                write!(self.output, "Justification (Enter for default): ")?;
                self.output.flush()?;
                self.read_line()?.unwrap_or_default()
            }
        };

        Ok(Decision {
            option_id,
            justification,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Submits `text` and answers escalations until the session completes.
///
/// Returns the final snapshot of a `Completed` session.
///
/// # Errors
///
/// `CliError::Classification` when the session fails or a local rejection
/// occurs, and the decision source's errors when an escalation cannot be
/// answered.
pub async fn drive_session(
    controller: &SessionController,
    text: &str,
    decisions: &mut dyn DecisionSource,
) -> Result<ClassificationSession, CliError> {
    let mut status = controller.submit(text).await?;

    while status == SessionStatus::AwaitingHumanInput {
        let Some(dialog) = controller.snapshot().dialog() else {
            break;
        };
        let decision = decisions.decide(&dialog)?;
        controller.set_justification(decision.justification);
        status = controller.select(&decision.option_id).await?;
    }

    let snapshot = controller.snapshot();
    match snapshot.status() {
        SessionStatus::Completed => Ok(snapshot),
        _ => Err(snapshot
            .last_error()
            .cloned()
            .unwrap_or_else(|| ClassifyError::Unknown {
                details: format!("session ended in status {}", snapshot.status()),
            })
            .into()),
    }
}
