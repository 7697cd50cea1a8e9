//! Async driver for the classification session.
//!
//! The controller owns the session behind a short-held mutex and performs the
//! calls the session asks for. The lock is taken to start an action and again
//! to apply its outcome, never across the network call, so observers can take
//! a snapshot while a request is in flight.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{info, warn};

use super::state::{ClassificationSession, PendingCall, Ticket};
use super::status::SessionStatus;
use crate::client::{ClassificationService, HttpClassificationService};
use crate::config::{ClientConfig, SessionConfig};
use crate::envelope::ResponseEnvelope;
use crate::error::ClassifyError;

/// Drives one [`ClassificationSession`] against a [`ClassificationService`].
pub struct SessionController {
    service: Arc<dyn ClassificationService>,
    session: Mutex<ClassificationSession>,
    /// Upper bound on any single call, independent of the service's own
    /// transport timeouts.
    call_timeout: Duration,
}

impl SessionController {
    pub fn new(
        service: Arc<dyn ClassificationService>,
        session: &SessionConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            service,
            session: Mutex::new(ClassificationSession::new(session)),
            call_timeout,
        }
    }

    /// Builds an HTTP-backed controller from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::Unknown` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClassifyError> {
        let service = HttpClassificationService::new(config.service.clone())?;
        Ok(Self::new(
            Arc::new(service),
            &config.session,
            config.service.request_timeout,
        ))
    }

    fn lock(&self) -> MutexGuard<'_, ClassificationSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> ClassificationSession {
        self.lock().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    /// Submits event text and waits for the service's answer.
    ///
    /// Returns the status after the answer was applied (`Failed` included;
    /// the error is in the session snapshot).
    ///
    /// # Errors
    ///
    /// Only local rejections: `Validation` and `Busy`.
    pub async fn submit(&self, text: &str) -> Result<SessionStatus, ClassifyError> {
        let call = self.lock().begin_submit(text)?;
        Ok(self.run(call).await)
    }

    /// Updates the justification of the open escalation.
    pub fn set_justification(&self, text: impl Into<String>) {
        self.lock().set_justification(text);
    }

    /// Answers the open escalation and waits for the service's answer.
    ///
    /// # Errors
    ///
    /// Only local rejections: `Busy`, `InvalidState` and `UnknownOption`.
    pub async fn select(&self, option_id: &str) -> Result<SessionStatus, ClassifyError> {
        let call = self.lock().begin_selection(option_id)?;
        Ok(self.run(call).await)
    }

    /// Returns the session to `Idle`.
    ///
    /// # Errors
    ///
    /// `Busy` while a call is in flight.
    pub fn reset(&self) -> Result<(), ClassifyError> {
        self.lock().reset()
    }

    async fn run(&self, call: PendingCall) -> SessionStatus {
        let guard = InFlightGuard {
            controller: self,
            ticket: Some(call.ticket()),
        };
        let outcome = match tokio::time::timeout(self.call_timeout, self.dispatch(&call)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout = %humantime::format_duration(self.call_timeout),
                    service = self.service.name(),
                    "Classification call exceeded timeout"
                );
                Err(ClassifyError::Timeout {
                    timeout: self.call_timeout,
                })
            }
        };
        guard.finish(outcome)
    }

    async fn dispatch(&self, call: &PendingCall) -> Result<ResponseEnvelope, ClassifyError> {
        match call {
            PendingCall::Classify { event_text, .. } => self.service.classify(event_text).await,
            PendingCall::Continue { request, .. } => self.service.continue_hitl(request).await,
        }
    }
}

/// Applies the outcome of one in-flight call.
///
/// If the future driving the call is dropped first (outer timeout, `select!`,
/// aborted task), the call is failed on drop so the session never stays busy.
struct InFlightGuard<'a> {
    controller: &'a SessionController,
    ticket: Option<Ticket>,
}

impl InFlightGuard<'_> {
    fn finish(mut self, outcome: Result<ResponseEnvelope, ClassifyError>) -> SessionStatus {
        let mut session = self.controller.lock();
        let Some(ticket) = self.ticket.take() else {
            return session.status();
        };
        match session.complete(ticket, outcome) {
            Some(status) => {
                info!(status = %status, "Classification call completed");
                status
            }
            None => session.status(),
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            warn!(
                ticket = ticket.value(),
                "Classification call abandoned before completion"
            );
            self.controller.lock().complete(
                ticket,
                Err(ClassifyError::Unknown {
                    details: "call abandoned before completion".to_string(),
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RecordedCall, ScriptedService};
    use crate::envelope::{
        DecisionOption, FinalOutcome, FormattedResult, HitlMetadata, OpaqueState, ResultFormat,
    };
    use crate::render::ResultView;
    use serde_json::json;

    fn escalation() -> ResponseEnvelope {
        ResponseEnvelope::Escalation {
            metadata: HitlMetadata {
                node_id: "1".to_string(),
                question: "Which domain?".to_string(),
                depth: 1,
                local_entropy: 0.92,
                children: vec![
                    DecisionOption {
                        id: "1.2".to_string(),
                        score: 0.8,
                        probability: 0.6,
                        rationale: "spill".to_string(),
                    },
                    DecisionOption {
                        id: "1.1".to_string(),
                        score: 0.4,
                        probability: 0.3,
                        rationale: "worker".to_string(),
                    },
                ],
            },
            state: OpaqueState::from_value(&json!({"beam": ["1"], "depth": 1})).unwrap(),
        }
    }

    fn formatted_terminal() -> ResponseEnvelope {
        ResponseEnvelope::Terminal {
            outcome: FinalOutcome {
                node_id: "1.2.3".to_string(),
                log_probability: -0.51,
                decision_history: Vec::new(),
            },
            format: ResultFormat::Formatted(FormattedResult {
                class_name: "Environment".to_string(),
                occurrence_type: "Oil leak".to_string(),
                technical_justification: None,
                confidence: None,
                technical_summary: None,
            }),
            state: OpaqueState::from_value(&json!({"done": true})).unwrap(),
        }
    }

    fn controller(service: Arc<ScriptedService>, timeout: Duration) -> SessionController {
        SessionController::new(service, &SessionConfig::default(), timeout)
    }

    #[tokio::test]
    async fn test_escalation_then_terminal() {
        let service = Arc::new(ScriptedService::new([
            Ok(escalation()),
            Ok(formatted_terminal()),
        ]));
        let controller = controller(service.clone(), Duration::from_secs(5));

        assert_eq!(
            controller.submit("Oil leak in production area").await,
            Ok(SessionStatus::AwaitingHumanInput)
        );
        let snapshot = controller.snapshot();
        assert!(snapshot.dialog().is_some());
        assert_eq!(snapshot.result_view(), ResultView::Empty);

        assert_eq!(controller.select("1.2").await, Ok(SessionStatus::Completed));

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            RecordedCall::Continue {
                state: OpaqueState::from_value(&json!({"beam": ["1"], "depth": 1})).unwrap(),
                selected_child: "1.2".to_string(),
                justification: "Escolha manual do usuário".to_string(),
            }
        );

        let snapshot = controller.snapshot();
        assert!(snapshot.dialog().is_none());
        assert!(matches!(snapshot.result_view(), ResultView::Formatted(_)));
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_call() {
        let service = Arc::new(ScriptedService::new([]));
        let controller = controller(service.clone(), Duration::from_secs(5));

        let result = controller.submit("   ").await;
        assert!(matches!(result, Err(ClassifyError::Validation { .. })));
        assert_eq!(service.call_count(), 0);
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_timeout_fails_session() {
        let service = Arc::new(
            ScriptedService::new([Ok(formatted_terminal())]).with_delay(Duration::from_millis(500)),
        );
        let controller = controller(service, Duration::from_millis(50));

        assert_eq!(controller.submit("slow").await, Ok(SessionStatus::Failed));
        assert_eq!(
            controller.snapshot().last_error(),
            Some(&ClassifyError::Timeout {
                timeout: Duration::from_millis(50)
            })
        );
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let service = Arc::new(
            ScriptedService::new([Ok(formatted_terminal())]).with_delay(Duration::from_millis(200)),
        );
        let controller = Arc::new(controller(service.clone(), Duration::from_secs(5)));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("first").await })
        };

        // Wait until the first call is in flight.
        while controller.status() != SessionStatus::Submitting {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.submit("second").await, Err(ClassifyError::Busy));
        assert_eq!(controller.select("1.2").await, Err(ClassifyError::Busy));
        assert_eq!(controller.snapshot().input_text(), "first");

        assert_eq!(first.await.unwrap(), Ok(SessionStatus::Completed));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_then_retry() {
        let service = Arc::new(ScriptedService::new([
            Err(ClassifyError::Transport { status: 500 }),
            Ok(formatted_terminal()),
        ]));
        let controller = controller(service, Duration::from_secs(5));

        assert_eq!(controller.submit("event").await, Ok(SessionStatus::Failed));
        assert_eq!(controller.snapshot().result_view(), ResultView::Empty);

        assert_eq!(controller.submit("event").await, Ok(SessionStatus::Completed));
        assert!(controller.snapshot().last_error().is_none());
    }

    #[tokio::test]
    async fn test_abandoned_call_releases_session() {
        let service = Arc::new(
            ScriptedService::new([Ok(formatted_terminal()), Ok(formatted_terminal())])
                .with_delay(Duration::from_millis(200)),
        );
        let controller = controller(service, Duration::from_secs(5));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), controller.submit("Oil leak")).await;
        assert!(abandoned.is_err());

        assert_eq!(controller.status(), SessionStatus::Failed);
        assert!(matches!(
            controller.snapshot().last_error(),
            Some(ClassifyError::Unknown { .. })
        ));
        assert_eq!(controller.reset(), Ok(()));
        assert_eq!(controller.submit("Oil leak").await, Ok(SessionStatus::Completed));
    }
}
