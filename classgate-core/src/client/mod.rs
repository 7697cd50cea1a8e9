//! Classification service clients.
//!
//! Both service operations (`/predict` and `/hitl/continue`) sit behind one
//! async trait so the session controller can be driven by the HTTP client in
//! production and by a scripted service in tests.
//!
//! Each call performs exactly one outbound request. There are no retries:
//! a continuation advances server-side state and must not be replayed.

mod http;
mod mock;

use async_trait::async_trait;

use crate::envelope::{OpaqueState, ResponseEnvelope};
use crate::error::ClassifyError;

pub use http::HttpClassificationService;
pub use mock::{RecordedCall, ScriptedService};

/// The human's answer to an escalation, ready to be sent back.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationRequest {
    /// State from the preceding response. `None` only when the caller lost it.
    pub state: Option<OpaqueState>,
    /// Identifier of the chosen child.
    pub selected_child: String,
    /// Reviewer justification, already defaulted if left blank.
    pub justification: String,
}

impl ContinuationRequest {
    /// Returns the state to echo, or `InvalidState` when there is nothing
    /// usable to continue from.
    pub fn require_state(&self) -> Result<&OpaqueState, ClassifyError> {
        match &self.state {
            Some(state) if !state.is_null() => Ok(state),
            _ => Err(ClassifyError::InvalidState),
        }
    }
}

/// Remote classification service.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Starts a classification for `event_text`.
    ///
    /// # Errors
    ///
    /// `Transport` for non-2xx answers, `MalformedResponse` when the body is
    /// not an envelope, `Timeout` and `Unknown` for failed calls.
    async fn classify(&self, event_text: &str) -> Result<ResponseEnvelope, ClassifyError>;

    /// Resumes a paused classification with the reviewer's choice.
    ///
    /// # Errors
    ///
    /// Fails fast with `InvalidState`, without any network call, if the
    /// request carries no usable state. Otherwise as [`Self::classify`].
    async fn continue_hitl(
        &self,
        request: &ContinuationRequest,
    ) -> Result<ResponseEnvelope, ClassifyError>;

    /// Returns the service name for logging.
    fn name(&self) -> &'static str;
}
