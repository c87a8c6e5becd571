use std::env;
use std::time::Duration;

use crate::retry::{DEFAULT_MAX_RETRIES, RetryPolicy};

const MAX_RETRIES_ENV: &str = "AWS_MAX_RETRIES";

/// Configuration for the Query API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL every request is posted to instead of `https://{host}/`.
    ///
    /// The signature still covers the request's own host; this only redirects the
    /// connection (local mocks, proxies).
    pub endpoint: Option<String>,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// Retry behaviour for transport failures and 5xx responses.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with `max_retries` taken from `AWS_MAX_RETRIES`.
    pub fn from_env() -> Self {
        let max_retries = parse_max_retries(env::var(MAX_RETRIES_ENV).ok().as_deref());
        Self::default().with_max_retries(max_retries)
    }

    /// Posts every request to `endpoint`.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// URL to post a request for `host` to.
    pub(crate) fn url_for(&self, host: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}/", host),
        }
    }
}

/// Parses a retry count, falling back to the default when missing or invalid.
fn parse_max_retries(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_MAX_RETRIES)
}
