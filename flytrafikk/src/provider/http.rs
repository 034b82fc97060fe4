//! HTTP client abstraction and the bounded requester.
//!
//! The [`AsyncHttpClient`] trait allows dependency injection and easier
//! testing by enabling mock HTTP clients in tests. [`BoundedRequester`]
//! layers the outbound-call policy on top of it:
//!
//! - attempt *n* gets a timeout of `base + step * (n - 1)`, capped at `max`
//! - transient failures (connect errors, timeouts, HTTP 429) retry with
//!   exponential backoff, `backoff_base * 2^(n-1)`
//! - any other HTTP status >= 400 fails immediately with the status and a
//!   body snippet attached
//! - a body starting with `<` is an HTML error page, not JSON, and fails
//!   immediately without retry
//! - an empty body is a valid empty result (`Value::Null`), not an error

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::types::ProviderError;
use crate::config::RetrySettings;

/// Maximum number of body characters attached to an HTTP failure.
const SNIPPET_LEN: usize = 200;

/// Default User-Agent for outbound requests.
const USER_AGENT: &str = concat!("flytrafikk/", env!("CARGO_PKG_VERSION"));

/// Status and body of an outbound call.
///
/// Status classification lives in [`BoundedRequester`], so client
/// implementations return non-2xx responses as `Ok`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Trait for asynchronous HTTP operations.
///
/// Implementations only surface transport-level failures as errors;
/// HTTP error statuses come back as a normal [`HttpResponse`].
pub trait AsyncHttpClient: Send + Sync {
    /// Performs a GET request with the given headers and per-attempt timeout.
    fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, ProviderError>> + Send;

    /// Performs a form-encoded POST (client-credentials token exchange).
    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, ProviderError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client tuned for short-lived request bursts.
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::InvalidResponse(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    fn map_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Transient(format!("request timeout: {}", e))
        } else if e.is_connect() {
            ProviderError::Transient(format!("connection error: {}", e))
        } else {
            ProviderError::InvalidResponse(format!("request failed: {}", e))
        }
    }

    async fn read_response(response: reqwest::Response) -> Result<HttpResponse, ProviderError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transient(format!("failed to read response: {}", e)))?;
        Ok(HttpResponse { status, body })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, ProviderError> {
        trace!(url = url, timeout_ms = timeout.as_millis() as u64, "HTTP GET");

        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(Self::map_error)?;
        Self::read_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, ProviderError> {
        trace!(url = url, "HTTP POST (form)");

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .form(form)
            .send()
            .await
            .map_err(Self::map_error)?;
        Self::read_response(response).await
    }
}

/// Issues single outbound calls under the retry/backoff/timeout policy.
#[derive(Clone)]
pub struct BoundedRequester<C: AsyncHttpClient> {
    client: C,
    retry: RetrySettings,
}

impl<C: AsyncHttpClient> BoundedRequester<C> {
    pub fn new(client: C, retry: RetrySettings) -> Self {
        Self { client, retry }
    }

    /// GET `url` and parse the body as JSON, retrying transient failures
    /// up to `max_attempts` times. Surfaces the last failure on exhaustion.
    pub async fn request_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        max_attempts: u32,
    ) -> Result<Value, ProviderError> {
        let max_attempts = max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let timeout = self.timeout_for(attempt);
            let outcome = self.client.get(url, headers, timeout).await;

            match Self::classify(outcome) {
                Ok(value) => {
                    debug!(url = url, attempt = attempt, "request succeeded");
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        url = url,
                        attempt = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!(url = url, attempt = attempt, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
        unreachable!("retry loop always returns")
    }

    /// Form-encoded POST with JSON response, single classification pass.
    ///
    /// Used for the token exchange, where a failed attempt degrades the
    /// credential tier instead of being retried aggressively.
    pub async fn post_form_json(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        let timeout = self.timeout_for(1);
        Self::classify(self.client.post_form(url, form, timeout).await)
    }

    fn timeout_for(&self, attempt: u32) -> Duration {
        let grown = self.retry.base_timeout + self.retry.timeout_step * attempt.saturating_sub(1);
        grown.min(self.retry.max_timeout)
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry.backoff_base * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    fn classify(outcome: Result<HttpResponse, ProviderError>) -> Result<Value, ProviderError> {
        let response = outcome?;

        if response.status >= 400 {
            return Err(ProviderError::Http {
                status: response.status,
                snippet: snippet(&response.body),
            });
        }

        let body = response.body.trim();
        if body.is_empty() {
            return Ok(Value::Null);
        }
        if body.starts_with('<') {
            return Err(ProviderError::InvalidResponse(format!(
                "HTML error page instead of JSON ({})",
                snippet(body)
            )));
        }

        serde_json::from_str(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("JSON parse failed: {}", e)))
    }
}

fn snippet(body: &str) -> String {
    let mut cut = body.len().min(SNIPPET_LEN);
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body[..cut].to_string()
}
