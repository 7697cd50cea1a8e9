//! CLI argument types for `classgate classify` and `classgate check-config`.
//!
//! Defined outside `main.rs` so integration tests can parse them directly.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use classgate_core::config::parse_duration;

// ─────────────────────────────────────────────────────────────────────────────
// Shared Service Args
// ─────────────────────────────────────────────────────────────────────────────

/// Where the configuration comes from and what to override in it.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Configuration file. Defaults to $CLASSGATE_CONFIG, then ./classgate.yaml.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Classification service base URL. Overrides the config file, and is
    /// enough on its own when no config file exists.
    #[arg(long, env = "CLASSGATE_BASE_URL")]
    pub base_url: Option<String>,

    /// JSON field that carries the event text in `/predict` requests.
    #[arg(long)]
    pub text_field: Option<String>,

    /// Per-call timeout (e.g. "30s", "2m").
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Classify Subcommand Args
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments for `classgate classify`.
///
/// Submits one event description and walks the session to a result,
/// answering escalations from `--select` or interactively.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Event description. Read from stdin when omitted.
    pub text: Option<String>,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Answer for the next escalation: an option id or its 1-based position.
    /// Repeat once per expected escalation.
    #[arg(long = "select", value_name = "OPTION")]
    pub selections: Vec<String>,

    /// Justification sent with every answer. Blank uses the configured default.
    #[arg(long)]
    pub justification: Option<String>,

    /// Print the final session report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Check-Config Subcommand Args
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments for `classgate check-config`.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
