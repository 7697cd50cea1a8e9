//! CLI argument parsing tests.
//!
//! Tests that ClassifyArgs and CheckConfigArgs parse correctly from
//! command-line strings, including the shared service overrides.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serial_test::serial;

use classgate::cli::{CheckConfigArgs, ClassifyArgs};

// ─────────────────────────────────────────────────────────────────────────────
// Test Harness
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal CLI parser that mirrors main.rs's Cli, usable from integration tests.
#[derive(Parser)]
#[command(name = "classgate")]
struct TestCli {
    #[command(subcommand)]
    command: TestCommands,
}

#[derive(Subcommand)]
enum TestCommands {
    Classify(ClassifyArgs),
    CheckConfig(CheckConfigArgs),
}

/// Parse a command-line string into TestCli.
///
/// Clears `CLASSGATE_BASE_URL` first so the environment cannot leak into
/// default values.
fn parse(args: &[&str]) -> Result<TestCli, clap::Error> {
    // SAFETY: callers are #[serial].
    unsafe { std::env::remove_var("CLASSGATE_BASE_URL") };
    TestCli::try_parse_from(args)
}

fn classify(args: &[&str]) -> ClassifyArgs {
    match parse(args).unwrap().command {
        TestCommands::Classify(args) => args,
        _ => panic!("expected Classify command"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ClassifyArgs Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
#[serial]
fn test_classify_defaults() {
    let args = classify(&["classgate", "classify", "Oil leak in production area"]);
    assert_eq!(args.text.as_deref(), Some("Oil leak in production area"));
    assert!(args.service.config.is_none());
    assert!(args.service.base_url.is_none());
    assert!(args.service.text_field.is_none());
    assert!(args.service.timeout.is_none());
    assert!(args.selections.is_empty());
    assert!(args.justification.is_none());
    assert!(!args.json);
    assert!(!args.verbose);
}

#[test]
#[serial]
fn test_classify_text_is_optional() {
    let args = classify(&["classgate", "classify"]);
    assert!(args.text.is_none());
}

#[test]
#[serial]
fn test_classify_all_options() {
    let args = classify(&[
        "classgate",
        "classify",
        "--config",
        "/etc/classgate.yaml",
        "--base-url",
        "http://classifier:8000",
        "--text-field",
        "texto_evento",
        "--timeout",
        "90s",
        "--select",
        "1.2",
        "--select",
        "2",
        "--justification",
        "Sheen on the drain",
        "--json",
        "-v",
        "Oil leak",
    ]);
    assert_eq!(
        args.service.config,
        Some(PathBuf::from("/etc/classgate.yaml"))
    );
    assert_eq!(
        args.service.base_url.as_deref(),
        Some("http://classifier:8000")
    );
    assert_eq!(args.service.text_field.as_deref(), Some("texto_evento"));
    assert_eq!(args.service.timeout, Some(Duration::from_secs(90)));
    assert_eq!(args.selections, vec!["1.2", "2"]);
    assert_eq!(args.justification.as_deref(), Some("Sheen on the drain"));
    assert!(args.json);
    assert!(args.verbose);
    assert_eq!(args.text.as_deref(), Some("Oil leak"));
}

#[test]
#[serial]
fn test_classify_compound_timeout() {
    let args = classify(&["classgate", "classify", "--timeout", "2m 30s", "x"]);
    assert_eq!(args.service.timeout, Some(Duration::from_secs(150)));
}

#[test]
#[serial]
fn test_classify_rejects_bad_timeout() {
    assert!(parse(&["classgate", "classify", "--timeout", "soon", "x"]).is_err());
}

#[test]
#[serial]
fn test_base_url_from_env() {
    // SAFETY: test is #[serial].
    unsafe { std::env::set_var("CLASSGATE_BASE_URL", "http://from-env:8000") };
    let cli = TestCli::try_parse_from(["classgate", "classify", "x"]).unwrap();
    unsafe { std::env::remove_var("CLASSGATE_BASE_URL") };

    match cli.command {
        TestCommands::Classify(args) => {
            assert_eq!(args.service.base_url.as_deref(), Some("http://from-env:8000"));
        }
        _ => panic!("expected Classify command"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CheckConfigArgs Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
#[serial]
fn test_check_config_args() {
    let cli = parse(&[
        "classgate",
        "check-config",
        "-c",
        "classgate.yaml",
        "--base-url",
        "http://localhost:8000",
    ])
    .unwrap();
    match cli.command {
        TestCommands::CheckConfig(args) => {
            assert_eq!(args.service.config, Some(PathBuf::from("classgate.yaml")));
            assert_eq!(
                args.service.base_url.as_deref(),
                Some("http://localhost:8000")
            );
            assert!(!args.verbose);
        }
        _ => panic!("expected CheckConfig command"),
    }
}

#[test]
#[serial]
fn test_unknown_subcommand_rejected() {
    assert!(parse(&["classgate", "wrap"]).is_err());
}
