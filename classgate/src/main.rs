//! classgate CLI entry point.
//!
//! Dispatches to `classify` (submit an event and answer escalations) or
//! `check-config` (load, override and validate configuration).

use clap::{Parser, Subcommand};

use classgate::cli::{CheckConfigArgs, ClassifyArgs};
use classgate::commands::{run_check_config, run_classify};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// classgate: classify events against the decision tree service, with a
/// human in the loop.
#[derive(Parser)]
#[command(name = "classgate", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one event description.
    Classify(ClassifyArgs),
    /// Validate configuration and print the effective service settings.
    CheckConfig(CheckConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Classify(args) => {
            init_tracing(args.verbose);
            match run_classify(args).await {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!(error = %e, "classify failed");
                    eprintln!("classgate classify: {e}");
                    1
                }
            }
        }
        Commands::CheckConfig(args) => {
            init_tracing(args.verbose);
            match run_check_config(args) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("classgate check-config: {e}");
                    1
                }
            }
        }
    };

    std::process::exit(code);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracing Init
// ─────────────────────────────────────────────────────────────────────────────

/// Logs go to stderr so stdout stays usable for `--json`.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` decides (silent if unset).
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
