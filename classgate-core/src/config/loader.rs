//! Locating, reading and validating `classgate.yaml`.
//!
//! Lookup order: an explicit path (the `--config` flag), then
//! `$CLASSGATE_CONFIG`, then `./classgate.yaml` in the working directory.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::error::ConfigError;
use super::schema::ClientConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CLASSGATE_CONFIG";

/// File name looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "classgate.yaml";

/// Candidate locations used when no explicit path is given, best first.
pub fn default_config_paths() -> Vec<PathBuf> {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .into_iter()
        .chain(std::iter::once(Path::new(".").join(DEFAULT_CONFIG_FILE)))
        .collect()
}

/// Resolves the config file to read.
///
/// An explicit path must exist; it never falls back to the defaults.
pub fn find_config_file(explicit_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let candidates = match explicit_path {
        Some(path) => vec![path.to_path_buf()],
        None => default_config_paths(),
    };

    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(ConfigError::ConfigFileNotFound {
            searched: candidates,
        }),
    }
}

/// Reads `path`, expands `${VAR}` references and parses the YAML.
///
/// The result is not validated; see [`load_and_validate`].
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Err(ConfigError::EmptyConfigFile);
    }

    let expanded = substitute_env_vars(&raw)?;
    Ok(serde_saphyr::from_str(&expanded)?)
}

pub fn load_and_validate(path: &Path) -> Result<ClientConfig, ConfigError> {
    let config = load_config(path)?;
    validate(&config)?;
    Ok(config)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Environment Variable Substitution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// SAFETY: .expect() on LazyLock with a compile-time literal regex pattern.
// The pattern is known-valid and tested by test_env_var_pattern_compiles().
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("BUG: ENV_VAR_PATTERN regex is invalid")
});

/// Expands environment references in raw config text.
///
/// `${VAR}` must be set. `${VAR:-fallback}` uses `fallback` when `VAR` is
/// unset. The first missing variable is reported.
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut missing = None;

    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(value) => value,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    if missing.is_none() {
                        missing = Some(var_name.to_string());
                    }
                    String::new()
                }
            },
        }
    });

    if let Some(var) = missing {
        return Err(ConfigError::MissingEnvVar {
            var,
            field: "configuration".to_string(),
        });
    }

    Ok(result.into_owned())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validate a configuration.
pub fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.schema != 1 {
        return Err(ConfigError::UnsupportedSchemaVersion {
            version: config.schema,
        });
    }

    let service = &config.service;
    let url = reqwest::Url::parse(&service.base_url).map_err(|e| ConfigError::InvalidUrl {
        url: service.base_url.clone(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: service.base_url.clone(),
            message: "scheme must be http or https".to_string(),
        });
    }

    if service.text_field.trim().is_empty() {
        return Err(ConfigError::EmptyField {
            field: "service.text_field".to_string(),
        });
    }

    if service.request_timeout.is_zero() {
        return Err(ConfigError::InvalidTimeout {
            field: "service.request_timeout".to_string(),
        });
    }
    if service.connect_timeout.is_zero() {
        return Err(ConfigError::InvalidTimeout {
            field: "service.connect_timeout".to_string(),
        });
    }

    if service.max_response_size == 0 {
        return Err(ConfigError::InvalidResponseSize {
            size: service.max_response_size,
        });
    }

    if config.session.default_justification.trim().is_empty() {
        return Err(ConfigError::EmptyField {
            field: "session.default_justification".to_string(),
        });
    }

    Ok(())
}
