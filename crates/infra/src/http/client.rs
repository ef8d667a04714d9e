//! reqwest wrapper shared by the endpoint client
//!
//! Only requests that are safe to repeat are retried: idempotent methods
//! whose body can be replayed. Project creation, login and multipart
//! uploads always go out once.

use std::time::Duration;

use assessor_domain::AssessorError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// How transient failures of idempotent requests are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: usize,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 1, base_backoff: Duration::from_millis(250) }
    }
}

impl RetryPolicy {
    fn attempts_for(&self, method: &Method) -> usize {
        if is_idempotent(method) {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Doubling delay before retry `n` (1-based), capped at [`MAX_BACKOFF`].
    fn delay(&self, retry: usize) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(6);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Shared HTTP transport with a fixed timeout and a [`RetryPolicy`]
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send a request, retrying transient failures when the request can be
    /// repeated safely.
    ///
    /// Non-2xx responses are returned as responses; the caller classifies them.
    ///
    /// # Errors
    /// `Network` for transport failures, `Internal` when the request cannot
    /// be built.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, AssessorError> {
        let mut request = builder.build().map_err(|err| AssessorError::from(InfraError::from(err)))?;
        let attempts = self.retry.attempts_for(request.method());
        let mut attempt = 1;

        loop {
            // Streaming bodies cannot be cloned; they get exactly one attempt.
            let replay = if attempt < attempts { request.try_clone() } else { None };
            let (method, url) = (request.method().clone(), request.url().clone());

            let outcome = self.client.execute(request).await;
            match (replay, is_transient(&outcome)) {
                (Some(next), true) => {
                    let delay = self.retry.delay(attempt);
                    debug!(
                        attempt,
                        %method,
                        %url,
                        delay_ms = delay.as_millis() as u64,
                        "transient HTTP failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    request = next;
                    attempt += 1;
                }
                _ => return finish(outcome, attempt, &method, &url),
            }
        }
    }
}

fn finish(
    outcome: Result<Response, reqwest::Error>,
    attempt: usize,
    method: &Method,
    url: &reqwest::Url,
) -> Result<Response, AssessorError> {
    match outcome {
        Ok(response) => {
            debug!(attempt, %method, %url, status = %response.status(), "HTTP response");
            Ok(response)
        }
        Err(err) => {
            warn!(attempt, %method, %url, error = %err, "HTTP request failed");
            Err(AssessorError::from(InfraError::from(err)))
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS)
}

/// Failures a repeat can plausibly cure. Credential and validation errors
/// never qualify.
fn is_transient(outcome: &Result<Response, reqwest::Error>) -> bool {
    match outcome {
        Ok(response) => {
            let status = response.status();
            status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
        }
        Err(err) => err.is_timeout() || err.is_connect(),
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: concat!("assessor-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.retry.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry.base_backoff = backoff;
        self
    }

    /// # Errors
    /// `Config` when the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpClient, AssessorError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|err| AssessorError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(HttpClient { client, retry: self.retry })
    }
}
