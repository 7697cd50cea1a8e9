//! Session status and state machine.

use serde::{Deserialize, Serialize};

// ============================================================================
// Session Status
// ============================================================================

/// Lifecycle status of the single classification session.
///
/// State machine transitions:
/// - Idle → Submitting (non-empty text submitted)
/// - Submitting → AwaitingHumanInput (service escalated)
/// - Submitting → Completed (terminal result)
/// - Submitting → Failed (call failed)
/// - AwaitingHumanInput → Submitting (option selected, or new text submitted)
/// - Completed → Submitting, Failed → Submitting (new submission)
/// - Completed / Failed / AwaitingHumanInput → Idle (reset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing submitted yet, or the session was reset
    Idle,
    /// A call is in flight; submit and select are rejected
    Submitting,
    /// The service paused and the dialog is open
    AwaitingHumanInput,
    /// A terminal result is displayed
    Completed,
    /// The last call failed; an error is displayed
    Failed,
}

impl SessionStatus {
    /// Returns true while a network call is outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Returns true if a new event text may be submitted.
    #[must_use]
    pub fn accepts_submission(&self) -> bool {
        !self.is_in_flight()
    }

    /// Checks if a transition from this status to another is valid.
    #[must_use]
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        matches!(
            (self, to),
            // Submissions
            (SessionStatus::Idle, SessionStatus::Submitting)
                | (SessionStatus::Completed, SessionStatus::Submitting)
                | (SessionStatus::Failed, SessionStatus::Submitting)
                | (SessionStatus::AwaitingHumanInput, SessionStatus::Submitting)
                // Call outcomes
                | (SessionStatus::Submitting, SessionStatus::AwaitingHumanInput)
                | (SessionStatus::Submitting, SessionStatus::Completed)
                | (SessionStatus::Submitting, SessionStatus::Failed)
                // Reset
                | (SessionStatus::Completed, SessionStatus::Idle)
                | (SessionStatus::Failed, SessionStatus::Idle)
                | (SessionStatus::AwaitingHumanInput, SessionStatus::Idle)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitting => write!(f, "submitting"),
            Self::AwaitingHumanInput => write!(f, "awaiting_human_input"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
