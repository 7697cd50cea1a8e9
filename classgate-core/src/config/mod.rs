//! Client configuration.
//!
//! Loaded from YAML with `${VAR}` / `${VAR:-default}` substitution, then
//! validated before any session is created.
//!
//! ```yaml
//! schema: 1
//! service:
//!   base_url: ${CLASSGATE_BASE_URL:-http://localhost:8000}
//!   text_field: texto_evento
//!   request_timeout: 2m
//! session:
//!   default_justification: Escolha manual do usuário
//! ```

mod duration_format;
mod error;
mod loader;
mod schema;

pub use duration_format::parse_duration;
pub use error::ConfigError;
pub use loader::{
    CONFIG_ENV_VAR, default_config_paths, find_config_file, load_and_validate, load_config,
    substitute_env_vars, validate,
};
pub use schema::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_JUSTIFICATION, DEFAULT_MAX_RESPONSE_SIZE,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_TEXT_FIELD, ServiceConfig, SessionConfig,
};
