//! Scripted classification service for tests and offline demos.
//!
//! Replies are consumed in order from a queue, and every call is recorded so
//! tests can assert on exactly what would have gone over the wire.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{ClassificationService, ContinuationRequest};
use crate::envelope::{OpaqueState, ResponseEnvelope};
use crate::error::ClassifyError;

/// A call observed by [`ScriptedService`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Classify {
        event_text: String,
    },
    Continue {
        state: OpaqueState,
        selected_child: String,
        justification: String,
    },
}

/// In-memory [`ClassificationService`] replaying a fixed script.
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<ResponseEnvelope, ClassifyError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    /// Delay applied before every reply
    delay: Duration,
    call_count: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not hide the recorded calls.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedService {
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = Result<ResponseEnvelope, ClassifyError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
        }
    }

    /// Delay every reply (for timeout and in-flight tests).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue another reply.
    pub fn push_reply(&self, reply: Result<ResponseEnvelope, ClassifyError>) {
        lock(&self.replies).push_back(reply);
    }

    /// Number of calls that reached the service (local rejections excluded).
    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Snapshot of the recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    async fn reply(&self, call: RecordedCall) -> Result<ResponseEnvelope, ClassifyError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        lock(&self.calls).push(call);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = lock(&self.replies).pop_front();
        next.unwrap_or_else(|| {
            Err(ClassifyError::Unknown {
                details: "scripted service has no reply left".to_string(),
            })
        })
    }
}

#[async_trait]
impl ClassificationService for ScriptedService {
    async fn classify(&self, event_text: &str) -> Result<ResponseEnvelope, ClassifyError> {
        debug!(text_len = event_text.len(), "Scripted classify");
        self.reply(RecordedCall::Classify {
            event_text: event_text.to_string(),
        })
        .await
    }

    async fn continue_hitl(
        &self,
        request: &ContinuationRequest,
    ) -> Result<ResponseEnvelope, ClassifyError> {
        let state = request.require_state()?.clone();
        debug!(selected_child = %request.selected_child, "Scripted continuation");
        self.reply(RecordedCall::Continue {
            state,
            selected_child: request.selected_child.clone(),
            justification: request.justification.clone(),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
