//! classgate core: client-side protocol and state machine for
//! human-in-the-loop tree classification.
//!
//! The remote service walks a decision tree and either returns a terminal
//! classification or pauses at a high-entropy node and asks a human to pick
//! one of the ranked children. This crate owns everything on the client side
//! of that exchange:
//!
//! - `envelope` - typed response model and wire codec
//! - `client` - `/predict` and `/hitl/continue` calls behind one trait
//! - `session` - the single-session state machine and its async controller
//! - `render` - result view selection (formatted, legacy or nothing) and the
//!   safe technical-summary markup tree
//! - `dialog` - escalation dialog view model
//! - `metrics` - per-session process metrics
//! - `config` - YAML configuration loading and validation
//!
//! Presentation is left to the caller: every view here is plain data.

pub mod client;
pub mod config;
pub mod dialog;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod render;
pub mod session;

pub use client::{ClassificationService, ContinuationRequest, HttpClassificationService};
pub use config::{ClientConfig, ServiceConfig, SessionConfig};
pub use dialog::{EscalationDialog, OptionView, ProbabilityTier};
pub use envelope::{
    ConfidenceLevel, DecisionOption, DecisionRecord, FinalOutcome, FormattedResult, HitlMetadata,
    OpaqueState, ResponseEnvelope, ResultFormat,
};
pub use error::ClassifyError;
pub use metrics::SessionMetrics;
pub use render::{ResultView, select_view};
pub use session::{ClassificationSession, SessionController, SessionStatus};
