//! HTTP client for the classification service.
//!
//! # Error Classification
//!
//! - Timeout errors → `ClassifyError::Timeout`
//! - Non-2xx status → `ClassifyError::Transport` (status attached)
//! - Oversized or unparseable body → `ClassifyError::MalformedResponse`
//! - Anything else (connection refused, DNS, TLS) → `ClassifyError::Unknown`
//!
//! No automatic retry: continuations advance server state.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::{ClassificationService, ContinuationRequest};
use crate::config::ServiceConfig;
use crate::envelope::wire::{ContinueBody, parse_envelope, predict_body};
use crate::envelope::ResponseEnvelope;
use crate::error::ClassifyError;

/// reqwest-backed [`ClassificationService`].
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpClassificationService {
    client: Client,
    config: ServiceConfig,
    /// Pre-computed endpoint URLs.
    predict_url: String,
    continue_url: String,
}

impl HttpClassificationService {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::Unknown` if the base URL is empty or not a
    /// valid absolute URL, or if the HTTP client cannot be built.
    pub fn new(config: ServiceConfig) -> Result<Self, ClassifyError> {
        if config.base_url.is_empty() {
            return Err(ClassifyError::Unknown {
                details: "service base_url is empty".to_string(),
            });
        }

        if let Err(e) = reqwest::Url::parse(&config.base_url) {
            return Err(ClassifyError::Unknown {
                details: format!("invalid service base_url '{}': {}", config.base_url, e),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClassifyError::Unknown {
                details: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            predict_url: config.predict_url(),
            continue_url: config.continue_url(),
            client,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// POST a JSON body and parse the envelope out of the answer.
    async fn post_envelope<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        operation: &'static str,
    ) -> Result<ResponseEnvelope, ClassifyError> {
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_error(e, operation))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                operation = operation,
                status = %status,
                "Classification service returned error status"
            );
            return Err(ClassifyError::Transport {
                status: status.as_u16(),
            });
        }

        let body_bytes = self.read_body_limited(response, operation).await?;
        let envelope = parse_envelope(&body_bytes).inspect_err(|e| {
            error!(
                operation = operation,
                error = %e,
                body_size = body_bytes.len(),
                "Failed to parse classification response"
            );
        })?;

        debug!(
            operation = operation,
            kind = envelope.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Received classification response"
        );

        Ok(envelope)
    }

    /// Collects the body, failing as soon as it grows past
    /// `max_response_size`. A declared `Content-Length` over the cap fails
    /// before any byte is read.
    async fn read_body_limited(
        &self,
        mut response: reqwest::Response,
        operation: &'static str,
    ) -> Result<Vec<u8>, ClassifyError> {
        let limit = self.config.max_response_size;
        let too_large = |seen: u64| {
            warn!(
                operation = operation,
                seen_bytes = seen,
                limit_bytes = limit,
                "Classification response over size limit"
            );
            ClassifyError::MalformedResponse {
                details: format!("response too large: more than {limit} bytes"),
            }
        };

        let declared = response.content_length();
        if let Some(len) = declared.filter(|len| *len > limit as u64) {
            return Err(too_large(len));
        }

        let capacity = declared.map_or(8 * 1024, |len| len as usize).min(limit);
        let mut body = Vec::with_capacity(capacity);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.classify_error(e, operation))?
        {
            let seen = body.len() + chunk.len();
            if seen > limit {
                return Err(too_large(seen as u64));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn classify_error(&self, error: reqwest::Error, operation: &'static str) -> ClassifyError {
        if error.is_timeout() {
            warn!(
                operation = operation,
                timeout_secs = self.config.request_timeout.as_secs(),
                "Classification request timed out"
            );
            ClassifyError::Timeout {
                timeout: self.config.request_timeout,
            }
        } else if error.is_connect() {
            warn!(
                operation = operation,
                url = %self.config.base_url,
                "Failed to connect to classification service"
            );
            ClassifyError::Unknown {
                details: format!("connection to {} failed: {}", self.config.base_url, error),
            }
        } else {
            error!(
                operation = operation,
                error = %error,
                "Classification request failed"
            );
            ClassifyError::Unknown {
                details: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl ClassificationService for HttpClassificationService {
    #[tracing::instrument(skip(self, event_text), fields(text_len = event_text.len()))]
    async fn classify(&self, event_text: &str) -> Result<ResponseEnvelope, ClassifyError> {
        debug!(url = %self.predict_url, "Submitting event for classification");
        let body = predict_body(&self.config.text_field, event_text);
        self.post_envelope(&self.predict_url, &body, "predict").await
    }

    #[tracing::instrument(skip(self, request), fields(selected_child = %request.selected_child))]
    async fn continue_hitl(
        &self,
        request: &ContinuationRequest,
    ) -> Result<ResponseEnvelope, ClassifyError> {
        let state = request.require_state().inspect_err(|_| {
            warn!("Continuation attempted without classification state");
        })?;

        debug!(
            url = %self.continue_url,
            justification_len = request.justification.len(),
            "Continuing classification with human decision"
        );
        let body = ContinueBody {
            state,
            selected_child: &request.selected_child,
            justification: &request.justification,
        };
        self.post_envelope(&self.continue_url, &body, "hitl_continue")
            .await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
