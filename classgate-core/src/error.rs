//! Error taxonomy shared by the service clients and the session controller.
//!
//! Local variants (`Validation`, `InvalidState`, `Busy`, `UnknownOption`) are
//! raised without touching the network. The rest describe a failed call and
//! move the session to `Failed`. None of them are fatal: every variant leaves
//! the session in a state the user can retry from.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving a classification session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
    /// The submitted event text is empty or whitespace-only.
    #[error("Invalid input: {details}")]
    Validation {
        /// What was wrong with the input
        details: String,
    },

    /// A continuation was attempted without a stored server state.
    #[error("No classification state available for continuation")]
    InvalidState,

    /// The service answered with a non-2xx status.
    #[error("Classification service returned HTTP {status}")]
    Transport {
        /// HTTP status code
        status: u16,
    },

    /// The body of a 2xx response is not a valid envelope.
    #[error("Malformed classification response: {details}")]
    MalformedResponse {
        /// Description of the parse or shape failure
        details: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("Classification service did not respond within {timeout:?}")]
    Timeout {
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// Any other failure during the call (connection refused, DNS, ...).
    #[error("Classification call failed: {details}")]
    Unknown {
        /// Underlying cause
        details: String,
    },

    /// A request is already in flight for this session.
    #[error("A classification request is already in progress")]
    Busy,

    /// The selected option is not offered by the current escalation.
    #[error("Option '{option_id}' is not offered by the current escalation")]
    UnknownOption {
        /// The rejected option identifier
        option_id: String,
    },
}

impl ClassifyError {
    /// Returns true if the error was raised locally, without a network call.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidState | Self::Busy | Self::UnknownOption { .. }
        )
    }

    /// Message suitable for showing to the person driving the session.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { .. } => "Please enter the event description.".to_string(),
            Self::InvalidState => {
                "Classification state not found. Please restart the classification.".to_string()
            }
            Self::Transport { status } => format!("Error while classifying: HTTP error {status}"),
            Self::MalformedResponse { .. } => {
                "Error while classifying: the service returned an unexpected response".to_string()
            }
            Self::Timeout { timeout } => format!(
                "Error while classifying: no response after {}",
                humantime::format_duration(*timeout)
            ),
            Self::Unknown { details } => format!("Unknown error while classifying: {details}"),
            Self::Busy => "A classification is already in progress.".to_string(),
            Self::UnknownOption { option_id } => {
                format!("'{option_id}' is not one of the available options.")
            }
        }
    }
}
