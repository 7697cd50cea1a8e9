//! Errors raised while locating, reading and validating `classgate.yaml`.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    // ─────────────────────────────────────────────────────────────────────────
    // Value validation errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Service base URL is not an absolute http(s) URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A timeout is zero.
    #[error("invalid {field}: must be greater than zero")]
    InvalidTimeout { field: String },

    /// A required string field is empty.
    #[error("field '{field}' must not be empty")]
    EmptyField { field: String },

    /// Response size cap is zero.
    #[error("invalid max_response_size {size}: must be > 0")]
    InvalidResponseSize { size: usize },

    /// `${VAR}` without a default, and `VAR` is unset.
    #[error("environment variable '{var}' is not set (referenced as '{field}')")]
    MissingEnvVar { var: String, field: String },

    /// Only `schema: 1` exists so far.
    #[error("unsupported schema version {version}, expected 1")]
    UnsupportedSchemaVersion { version: u32 },

    // ─────────────────────────────────────────────────────────────────────────
    // File errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    ParseError(#[from] serde_saphyr::Error),

    #[error("cannot read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// No file at the explicit path, or at any default location.
    #[error("no configuration file found (searched: {searched:?})")]
    ConfigFileNotFound { searched: Vec<PathBuf> },

    #[error("configuration file is empty")]
    EmptyConfigFile,
}
