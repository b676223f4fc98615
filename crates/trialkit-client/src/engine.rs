//! The resilient request engine: one logical API call, bounded retries.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::error::{classify, ApiError};
use crate::retry::RetryPolicy;
use crate::transport::{HttpMethod, Transport, TransportRequest};
use crate::version::{
    compatibility_warning, VersionObserver, API_VERSION_HEADER, CLIENT_VERSION,
    CLIENT_VERSION_HEADER,
};

/// One logical API request.
///
/// Immutable once built: on retry the engine re-sends exactly the same
/// method, path, body, and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            params: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

/// Executes logical requests against the service, classifying failures and
/// retrying transient ones.
///
/// The engine holds only immutable state after construction (key, base
/// URL, shared transport), so concurrent logical requests never contend;
/// each `execute` call runs its own sequential attempt loop and suspends
/// only at the backoff sleep and the transport I/O wait. Dropping the
/// returned future cancels either cleanly.
#[derive(Clone)]
pub struct RequestEngine {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn VersionObserver>,
    retry: RetryPolicy,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
}

impl RequestEngine {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn VersionObserver>,
    ) -> Self {
        Self {
            transport,
            observer,
            retry: config.retry_policy(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout_ms: config.timeout.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Performs the request, retrying transparently per the retry policy.
    ///
    /// Terminal failures and exhausted budgets surface the last observed
    /// failure unchanged. Success payloads decode to JSON when the
    /// response declares a JSON content type; otherwise the raw text is
    /// wrapped as `{"message": <text>}`.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let mut attempt: u32 = 1;
        loop {
            let failure = match self.attempt_once(request).await {
                Ok(payload) => return Ok(payload),
                Err(failure) => failure,
            };

            if !failure.retryable() || attempt >= self.retry.max_attempts {
                return Err(failure);
            }

            let delay = self.retry.delay(attempt, failure.retry_after());
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt_once(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let response = self
            .transport
            .execute(self.to_transport_request(request))
            .await
            .map_err(|error| ApiError::Network {
                message: error.message().to_owned(),
                retryable: error.is_retryable(),
            })?;

        if let Some(server_version) = response.header(API_VERSION_HEADER) {
            let warning = compatibility_warning(CLIENT_VERSION, server_version);
            self.observer
                .version_observed(CLIENT_VERSION, server_version, warning.as_deref());
        }

        if response.status < 400 {
            if response.declares_json() {
                return serde_json::from_str(&response.body).map_err(|error| ApiError::Unknown {
                    message: format!("invalid JSON in response body: {error}"),
                    detail: None,
                    status: response.status,
                });
            }
            return Ok(json!({ "message": response.body }));
        }

        let decoded_body: Option<Value> = response
            .declares_json()
            .then(|| serde_json::from_str(&response.body).ok())
            .flatten();

        Err(classify(
            response.status,
            decoded_body.as_ref(),
            &response.body,
            &response.headers,
        ))
    }

    fn to_transport_request(&self, request: &ApiRequest) -> TransportRequest {
        let mut url = format!("{}{}", self.base_url, request.path);
        if !request.params.is_empty() {
            let query = request
                .params
                .iter()
                .map(|(name, value)| {
                    format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
                })
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }

        let mut transport_request = TransportRequest::new(request.method, url)
            .with_header("authorization", format!("Bearer {}", self.api_key))
            .with_header("content-type", "application/json")
            .with_header(CLIENT_VERSION_HEADER, CLIENT_VERSION)
            .with_timeout_ms(self.timeout_ms);

        if let Some(body) = &request.body {
            transport_request = transport_request.with_body(body.to_string());
        }

        transport_request
    }
}
