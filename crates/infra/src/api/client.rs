//! Authenticated API client
//!
//! Single HTTP entry point for the backend. Every request carries the stored
//! credential as a bearer header; every 401/403 purges the session through
//! the registered rejection handler before the error reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use assessor_core::{CredentialRejectionHandler, CredentialStore};
use assessor_domain::ApiConfig;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::errors::ApiError;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for API (e.g., "https://assessor.example.com/api")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
    /// Total attempts for idempotent requests with a replayable body
    pub max_attempts: usize,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            max_attempts: config.max_attempts,
        }
    }
}

enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// API client with credential injection and central rejection handling
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    timeout: Duration,
    credentials: Arc<dyn CredentialStore>,
    on_rejected: Option<Arc<dyn CredentialRejectionHandler>>,
}

impl ApiClient {
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn new(
        config: ApiClientConfig,
        credentials: Arc<dyn CredentialStore>,
        on_rejected: Option<Arc<dyn CredentialRejectionHandler>>,
    ) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            credentials,
            on_rejected,
        })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Errors
    /// See [`ApiError`].
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, &[], Body::Empty).await
    }

    /// GET with query parameters; empty values are dropped.
    ///
    /// # Errors
    /// See [`ApiError`].
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, query, Body::Empty).await
    }

    /// # Errors
    /// See [`ApiError`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Config(format!("Failed to serialize body: {e}")))?;
        self.execute(Method::POST, path, &[], Body::Json(body)).await
    }

    /// POST without a body
    ///
    /// # Errors
    /// See [`ApiError`].
    #[instrument(skip(self), fields(path = %path))]
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::POST, path, &[], Body::Empty).await
    }

    /// PUT without a body (archive/unarchive style actions)
    ///
    /// # Errors
    /// See [`ApiError`].
    #[instrument(skip(self), fields(path = %path))]
    pub async fn put<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, &[], Body::Empty).await
    }

    /// Multipart POST. The content type (with its boundary) is left to the
    /// form; the request is sent once since the body cannot be replayed.
    ///
    /// # Errors
    /// See [`ApiError`].
    #[instrument(skip(self, form), fields(path = %path))]
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, &[], Body::Multipart(form)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Body,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "API request");

        let mut request = self.authorize(self.http.request(method.clone(), &url));
        let query: Vec<(&str, &str)> =
            query.iter().copied().filter(|(_, value)| !value.is_empty()).collect();
        if !query.is_empty() {
            request = request.query(&query);
        }

        let sent = match body {
            Body::Empty => self.send(self.http.send(request)).await,
            Body::Json(json) => self.send(self.http.send(request.json(&json))).await,
            Body::Multipart(form) => self.send(self.http.send(request.multipart(form))).await,
        };
        let response = sent?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), &text);
            if err.is_credential_rejection() {
                self.reject_credential(&url, status);
            } else {
                warn!(%method, url = %url, %status, "API request failed");
            }
            return Err(err);
        }

        Self::decode(status, response).await
    }

    /// Bearer header when a credential is stored. Only the Authorization
    /// header is set; JSON and multipart bodies choose their own content type.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.load() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(err) => {
                warn!(error = %err, "failed to read stored credential, sending unauthenticated");
                request
            }
        }
    }

    async fn send(
        &self,
        pending: impl std::future::Future<Output = Result<Response, assessor_domain::AssessorError>>,
    ) -> Result<Response, ApiError> {
        match tokio::time::timeout(self.timeout, pending).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(ApiError::from(err)),
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }

    fn reject_credential(&self, url: &str, status: StatusCode) {
        warn!(url = %url, %status, "credential rejected");
        if let Some(handler) = &self.on_rejected {
            handler.on_credential_rejected();
        } else if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "failed to purge rejected credential");
        }
    }

    async fn decode<T: DeserializeOwned>(status: StatusCode, response: Response) -> Result<T, ApiError> {
        let text = if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            String::new()
        } else {
            response
                .text()
                .await
                .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?
        };

        if text.trim().is_empty() {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                ApiError::Decode(format!("empty {} response where a body was expected", status.as_u16()))
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    credentials: Option<Arc<dyn CredentialStore>>,
    on_rejected: Option<Arc<dyn CredentialRejectionHandler>>,
}

impl ApiClientBuilder {
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Handler invoked on every 401/403 response
    pub fn on_rejected(mut self, handler: Arc<dyn CredentialRejectionHandler>) -> Self {
        self.on_rejected = Some(handler);
        self
    }

    /// # Errors
    /// Returns error if the credential store is missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let credentials = self
            .credentials
            .ok_or_else(|| ApiError::Config("Credential store not set".to_string()))?;

        ApiClient::new(config, credentials, self.on_rejected)
    }
}
