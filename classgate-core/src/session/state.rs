//! The single classification session as a pure state machine.
//!
//! `ClassificationSession` never performs I/O. Starting an action returns a
//! [`PendingCall`] describing the request to make; the driver performs it and
//! hands the outcome back through [`ClassificationSession::complete`]. The
//! async driver is [`super::SessionController`].

use tracing::{debug, info, warn};

use super::status::SessionStatus;
use crate::client::ContinuationRequest;
use crate::config::SessionConfig;
use crate::dialog::EscalationDialog;
use crate::envelope::{OpaqueState, ResponseEnvelope};
use crate::error::ClassifyError;
use crate::metrics::SessionMetrics;
use crate::render::{ResultView, select_view};

/// Identifies one outbound call. Completions carrying any other ticket than
/// the in-flight one are stale and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A call the driver must perform on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingCall {
    Classify {
        ticket: Ticket,
        event_text: String,
    },
    Continue {
        ticket: Ticket,
        request: ContinuationRequest,
    },
}

impl PendingCall {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Classify { ticket, .. } | Self::Continue { ticket, .. } => *ticket,
        }
    }
}

/// The one active classification session of a client instance.
#[derive(Debug, Clone)]
pub struct ClassificationSession {
    input_text: String,
    status: SessionStatus,
    last_envelope: Option<ResponseEnvelope>,
    last_state: Option<OpaqueState>,
    last_error: Option<ClassifyError>,
    hitl_justification: String,
    dialog_open: bool,
    default_justification: String,
    in_flight: Option<Ticket>,
    next_ticket: u64,
    /// Escalations answered or pending since the last submission.
    escalations: u32,
}

impl Default for ClassificationSession {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl ClassificationSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            input_text: String::new(),
            status: SessionStatus::Idle,
            last_envelope: None,
            last_state: None,
            last_error: None,
            hitl_justification: String::new(),
            dialog_open: false,
            default_justification: config.default_justification.clone(),
            in_flight: None,
            next_ticket: 0,
            escalations: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn last_envelope(&self) -> Option<&ResponseEnvelope> {
        self.last_envelope.as_ref()
    }

    pub fn last_state(&self) -> Option<&OpaqueState> {
        self.last_state.as_ref()
    }

    pub fn last_error(&self) -> Option<&ClassifyError> {
        self.last_error.as_ref()
    }

    /// Display string for the last error, if any.
    pub fn last_error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(ClassifyError::user_message)
    }

    pub fn justification(&self) -> &str {
        &self.hitl_justification
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn escalations(&self) -> u32 {
        self.escalations
    }

    /// Which result view to show right now.
    pub fn result_view(&self) -> ResultView {
        select_view(self.last_envelope.as_ref())
    }

    /// The escalation dialog, while it is open.
    pub fn dialog(&self) -> Option<EscalationDialog> {
        if !self.dialog_open {
            return None;
        }
        self.last_envelope
            .as_ref()
            .and_then(ResponseEnvelope::hitl_metadata)
            .map(|metadata| EscalationDialog::new(metadata, &self.hitl_justification))
    }

    pub fn metrics(&self) -> SessionMetrics {
        SessionMetrics::collect(self.last_envelope.as_ref(), self.escalations)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────

    /// Starts a classification of `text`.
    ///
    /// # Errors
    ///
    /// - `Busy` while a call is in flight (nothing changes)
    /// - `Validation` for empty or whitespace-only text (recorded as the
    ///   last error; status and results are kept)
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingCall, ClassifyError> {
        if !self.status.accepts_submission() {
            return Err(ClassifyError::Busy);
        }

        if text.trim().is_empty() {
            let err = ClassifyError::Validation {
                details: "event text is empty".to_string(),
            };
            self.last_error = Some(err.clone());
            return Err(err);
        }

        if self.status == SessionStatus::AwaitingHumanInput {
            info!("New submission abandons the pending escalation");
        }

        self.input_text = text.to_string();
        self.last_envelope = None;
        self.last_state = None;
        self.last_error = None;
        self.hitl_justification.clear();
        self.dialog_open = false;
        self.escalations = 0;
        self.transition(SessionStatus::Submitting);

        let ticket = self.issue_ticket();
        info!(ticket = ticket.value(), text_len = text.len(), "Classification submitted");
        Ok(PendingCall::Classify {
            ticket,
            event_text: text.to_string(),
        })
    }

    /// Updates the justification typed into the open dialog.
    pub fn set_justification(&mut self, text: impl Into<String>) {
        self.hitl_justification = text.into();
    }

    /// Answers the open escalation with `option_id`.
    ///
    /// A blank justification is replaced by the configured default; any
    /// other text is sent unchanged.
    ///
    /// # Errors
    ///
    /// - `Busy` while a call is in flight
    /// - `InvalidState` when no escalation with stored state is open
    /// - `UnknownOption` when `option_id` is not among the offered children
    pub fn begin_selection(&mut self, option_id: &str) -> Result<PendingCall, ClassifyError> {
        if self.status.is_in_flight() {
            return Err(ClassifyError::Busy);
        }

        let offered = match (self.status, &self.last_envelope, &self.last_state) {
            (SessionStatus::AwaitingHumanInput, Some(envelope), Some(_)) => envelope
                .hitl_metadata()
                .map(|m| m.option(option_id).is_some()),
            _ => None,
        };
        let Some(offered) = offered else {
            warn!(status = %self.status, "Selection without a pending escalation");
            self.last_error = Some(ClassifyError::InvalidState);
            return Err(ClassifyError::InvalidState);
        };

        if !offered {
            let err = ClassifyError::UnknownOption {
                option_id: option_id.to_string(),
            };
            self.last_error = Some(err.clone());
            return Err(err);
        }

        let justification = if self.hitl_justification.trim().is_empty() {
            self.default_justification.clone()
        } else {
            self.hitl_justification.clone()
        };

        self.last_error = None;
        self.dialog_open = false;
        self.transition(SessionStatus::Submitting);

        let ticket = self.issue_ticket();
        info!(ticket = ticket.value(), selected_child = option_id, "Escalation answered");
        Ok(PendingCall::Continue {
            ticket,
            request: ContinuationRequest {
                state: self.last_state.clone(),
                selected_child: option_id.to_string(),
                justification,
            },
        })
    }

    /// Applies the outcome of the call identified by `ticket`.
    ///
    /// Returns the new status, or `None` if the completion was stale and
    /// discarded.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ResponseEnvelope, ClassifyError>,
    ) -> Option<SessionStatus> {
        if self.in_flight != Some(ticket) {
            warn!(
                ticket = ticket.value(),
                in_flight = ?self.in_flight.map(|t| t.value()),
                "Discarding stale classification completion"
            );
            return None;
        }
        self.in_flight = None;

        match outcome {
            Ok(envelope) => {
                let next = if envelope.is_escalation() {
                    SessionStatus::AwaitingHumanInput
                } else {
                    SessionStatus::Completed
                };
                debug!(kind = envelope.kind(), "Applying classification response");

                if next == SessionStatus::AwaitingHumanInput {
                    self.escalations += 1;
                    self.hitl_justification.clear();
                    self.dialog_open = true;
                } else {
                    self.dialog_open = false;
                }
                self.last_state = Some(envelope.state().clone());
                self.last_envelope = Some(envelope);
                self.last_error = None;
                self.transition(next);
            }
            Err(err) => {
                warn!(error = %err, "Classification call failed");
                self.last_envelope = None;
                self.last_state = None;
                self.dialog_open = false;
                self.last_error = Some(err);
                self.transition(SessionStatus::Failed);
            }
        }

        Some(self.status)
    }

    /// Returns the session to `Idle`, dropping results, state and errors.
    ///
    /// # Errors
    ///
    /// `Busy` while a call is in flight.
    pub fn reset(&mut self) -> Result<(), ClassifyError> {
        if self.status.is_in_flight() {
            return Err(ClassifyError::Busy);
        }
        if self.status != SessionStatus::Idle {
            self.transition(SessionStatus::Idle);
        }
        self.input_text.clear();
        self.last_envelope = None;
        self.last_state = None;
        self.last_error = None;
        self.hitl_justification.clear();
        self.dialog_open = false;
        self.escalations = 0;
        Ok(())
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight = Some(ticket);
        ticket
    }

    fn transition(&mut self, to: SessionStatus) {
        debug_assert!(
            self.status.can_transition_to(to),
            "invalid session transition {} -> {}",
            self.status,
            to
        );
        debug!(from = %self.status, to = %to, "Session transition");
        self.status = to;
    }
}
