//! Configuration schema type definitions.

use serde::Deserialize;
use std::time::Duration;

use super::duration_format;

pub const DEFAULT_TEXT_FIELD: &str = "event_text";
/// Inference walks several tree levels with an LLM call each, so responses
/// routinely take tens of seconds.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10 MB
/// Sent as the justification when the reviewer leaves it blank.
pub const DEFAULT_JUSTIFICATION: &str = "Escolha manual do usuário";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-Level Schema
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Root configuration structure.
///
/// # Example
/// ```yaml
/// schema: 1
/// service:
///   base_url: http://localhost:8000
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Schema version (must be 1).
    pub schema: u32,

    /// Classification service connection.
    pub service: ServiceConfig,

    /// Session behaviour.
    #[serde(default)]
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Configuration with defaults everywhere except the service address.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            schema: 1,
            service: ServiceConfig::with_base_url(base_url),
            session: SessionConfig::default(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the classification service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL (e.g., "http://localhost:8000"). `/predict` and
    /// `/hitl/continue` are resolved against it.
    pub base_url: String,

    /// JSON key carrying the event text in `/predict` requests.
    #[serde(default = "default_text_field")]
    pub text_field: String,

    /// Whole-request timeout (connect + response).
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "duration_format::deserialize"
    )]
    pub request_timeout: Duration,

    /// TCP + TLS handshake timeout.
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "duration_format::deserialize"
    )]
    pub connect_timeout: Duration,

    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_size")]
    pub max_response_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            text_field: default_text_field(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Create a new config with the specified base URL.
    ///
    /// Uses default values for all other settings.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }

    pub fn continue_url(&self) -> String {
        format!("{}/hitl/continue", self.base_url.trim_end_matches('/'))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Justification sent when the reviewer selects an option without
    /// typing one.
    #[serde(default = "default_justification")]
    pub default_justification: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_justification: default_justification(),
        }
    }
}

fn default_text_field() -> String {
    DEFAULT_TEXT_FIELD.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_max_response_size() -> usize {
    DEFAULT_MAX_RESPONSE_SIZE
}

fn default_justification() -> String {
    DEFAULT_JUSTIFICATION.to_string()
}
