use std::time::Duration;

use crate::error::ApiError;
use crate::retry::RetryPolicy;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TRIALKIT_API_KEY";

/// Environment variable overriding the service base URL.
pub const API_URL_ENV: &str = "TRIALKIT_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection and retry settings for a [`crate::TrialClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        let retry = RetryPolicy::default();
        Self {
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
            max_attempts: retry.max_attempts,
            base_delay: retry.base_delay,
            max_delay: retry.max_delay,
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds a config from `TRIALKIT_API_KEY` and `TRIALKIT_API_URL`.
    ///
    /// The URL defaults to the local development server when unset. A
    /// missing API key is an authentication failure up front, before any
    /// request is attempted.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ApiError::Authentication {
                message: format!(
                    "API key is required; set {API_KEY_ENV} or pass the key explicitly"
                ),
                detail: None,
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(API_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Trailing slashes are trimmed so request paths can always start
    /// with `/`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
        }
    }
}
