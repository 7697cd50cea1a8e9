//! Error types for the classgate CLI.

use classgate_core::ClassifyError;
use classgate_core::config::ConfigError;

/// Errors that end a CLI invocation with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The configuration could not be found, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session ended in an error (local or from the service).
    #[error("{}", .0.user_message())]
    Classification(#[from] ClassifyError),

    /// Neither an argument nor stdin provided any event text.
    #[error("No event text given; pass it as an argument or on stdin")]
    NoInput,

    /// An escalation arrived and there was no answer for it.
    #[error("Escalation at node {node_id} needs a decision; pass --select or run interactively")]
    SelectionRequired {
        /// Node awaiting the decision
        node_id: String,
    },

    /// A `--select` value matched neither an option id nor a position.
    #[error("Option '{input}' is not offered at node {node_id}")]
    UnknownChoice {
        /// The rejected value
        input: String,
        /// Node awaiting the decision
        node_id: String,
    },

    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON report could not be produced.
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}
