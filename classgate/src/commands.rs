//! Subcommand runners.

use std::io::{IsTerminal, Read, Write};

use classgate_core::config::{
    CONFIG_ENV_VAR, ConfigError, find_config_file, load_config, validate,
};
use classgate_core::{ClassificationSession, ClientConfig, SessionController};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{CheckConfigArgs, ClassifyArgs, ServiceArgs};
use crate::error::CliError;
use crate::flow::{DecisionSource, PromptDecisions, ScriptedDecisions, drive_session};
use crate::terminal::{render_metrics, render_result};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Loads the configuration file (if any), applies CLI overrides and
/// validates the result.
///
/// A missing config file is only an error when no `--base-url` is given, or
/// when `--config` or `$CLASSGATE_CONFIG` names a file that does not exist.
pub fn resolve_config(args: &ServiceArgs) -> Result<ClientConfig, CliError> {
    let explicit = args.config.is_some() || std::env::var_os(CONFIG_ENV_VAR).is_some();
    let mut config = match find_config_file(args.config.as_deref()) {
        Ok(path) => {
            info!(path = %path.display(), "Loading configuration");
            load_config(&path)?
        }
        Err(ConfigError::ConfigFileNotFound { .. }) if !explicit && args.base_url.is_some() => {
            debug!("No configuration file found, using defaults");
            ClientConfig::with_base_url(String::new())
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(base_url) = &args.base_url {
        config.service.base_url = base_url.clone();
    }
    if let Some(text_field) = &args.text_field {
        config.service.text_field = text_field.clone();
    }
    if let Some(timeout) = args.timeout {
        config.service.request_timeout = timeout;
    }

    validate(&config)?;
    Ok(config)
}

// ─────────────────────────────────────────────────────────────────────────────
// classify
// ─────────────────────────────────────────────────────────────────────────────

/// JSON report printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    status: classgate_core::SessionStatus,
    result: classgate_core::ResultView,
    metrics: classgate_core::SessionMetrics,
    envelope: Option<&'a classgate_core::ResponseEnvelope>,
}

pub async fn run_classify(args: ClassifyArgs) -> Result<i32, CliError> {
    let config = resolve_config(&args.service)?;
    let text = read_event_text(args.text)?;
    let controller = SessionController::from_config(&config)?;

    let interactive = args.selections.is_empty() && std::io::stdin().is_terminal();
    let mut decisions: Box<dyn DecisionSource> = if interactive {
        // Keep stdout clean for the JSON report.
        let output: Box<dyn Write> = if args.json {
            Box::new(std::io::stderr())
        } else {
            Box::new(std::io::stdout())
        };
        Box::new(PromptDecisions::new(
            std::io::stdin().lock(),
            output,
            args.justification,
        ))
    } else {
        Box::new(ScriptedDecisions::new(args.selections, args.justification))
    };

    let session = drive_session(&controller, &text, decisions.as_mut()).await?;

    let mut stdout = std::io::stdout().lock();
    write_report(&mut stdout, &session, args.json)?;
    Ok(0)
}

fn read_event_text(text: Option<String>) -> Result<String, CliError> {
    if let Some(text) = text {
        return Ok(text);
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Describe the event, then press Ctrl-D:");
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Err(CliError::NoInput);
    }
    Ok(buf)
}

/// Writes the final result and metrics, as text or as a JSON report.
pub fn write_report(
    out: &mut dyn Write,
    session: &ClassificationSession,
    json: bool,
) -> Result<(), CliError> {
    if json {
        let report = Report {
            status: session.status(),
            result: session.result_view(),
            metrics: session.metrics(),
            envelope: session.last_envelope(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    write!(out, "\n{}", render_result(&session.result_view()))?;
    write!(out, "\n{}", render_metrics(&session.metrics()))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// check-config
// ─────────────────────────────────────────────────────────────────────────────

pub fn run_check_config(args: CheckConfigArgs) -> Result<i32, CliError> {
    let config = resolve_config(&args.service)?;
    println!("Configuration OK");
    println!("  predict:       {}", config.service.predict_url());
    println!("  continue:      {}", config.service.continue_url());
    println!("  text field:    {}", config.service.text_field);
    println!(
        "  timeout:       {}",
        humantime::format_duration(config.service.request_timeout)
    );
    println!("  justification: {}", config.session.default_justification);
    Ok(0)
}
