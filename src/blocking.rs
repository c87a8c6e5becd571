//! Synchronous (blocking) client for the AWS Query APIs.
//!
//! This module is only available when the `blocking` feature is enabled.
//! It mirrors the async [`crate::client::Client`] using `reqwest::blocking`;
//! backoff sleeps block the calling thread and there is no cancellation.
//!
//! # Example
//!
//! ```no_run
//! use rs_aws_query::blocking::Client;
//! use rs_aws_query::sdb::ListDomains;
//!
//! fn main() -> rs_aws_query::Result<()> {
//!     let client = Client::from_env()?;
//!     let resp = client.call(&ListDomains::default())?;
//!     for name in &resp.result.domain_names {
//!         println!("{name}");
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::action::Action;
use crate::config::ClientConfig;
use crate::credential::{ChainProvider, Credential, CredentialProvider};
use crate::error::{AwsError, Result};
use crate::exec::decode_response;
use crate::request::Request;
use crate::retry::RetryPolicy;
use crate::transport::FORM_CONTENT_TYPE;

/// Synchronous client for the AWS Query APIs.
pub struct Client {
    http: reqwest::blocking::Client,
    config: ClientConfig,
    credential: Credential,
}

impl Client {
    /// Creates a new blocking client with an explicit credential.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Creates a new blocking client with custom configuration.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AwsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            credential,
        })
    }

    /// Creates a new blocking client using the default credential chain.
    pub fn from_env() -> Result<Self> {
        let credential = ChainProvider::default_chain().resolve()?;
        Self::with_config(credential, ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts an unsigned request signed with this client's credential.
    pub fn new_request(&self, host: impl Into<String>, version: impl Into<String>) -> Request {
        Request::new(host, version, self.credential.clone())
    }

    /// Executes a typed action.
    pub fn call<A: Action>(&self, action: &A) -> Result<A::Response> {
        let request = action.to_request(&self.credential)?;
        self.send(request)
    }

    /// Signs (if needed), posts and decodes `request`, retrying transport failures
    /// and 5xx responses.
    pub fn send<R: DeserializeOwned>(&self, mut request: Request) -> Result<R> {
        let body = request.encode()?;
        let url = self.config.url_for(request.host());
        let policy = &self.config.retry;
        let host = request.host();

        let mut last_response = None;
        let mut last_error = None;

        for attempt in 0..=policy.max_retries {
            if attempt > 0 {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    host,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying"
                );
                std::thread::sleep(delay);
            }

            let start = Instant::now();
            let result = self
                .http
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body.clone())
                .send();
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(response) if RetryPolicy::is_final_status(response.status().as_u16()) => {
                    tracing::debug!(
                        host,
                        attempt,
                        status = response.status().as_u16(),
                        elapsed_ms,
                        "response received"
                    );
                    return read_response(response);
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::warn!(
                        host,
                        attempt,
                        max_retries = policy.max_retries,
                        status,
                        elapsed_ms,
                        "server error"
                    );
                    match response.bytes() {
                        Ok(body) => last_response = Some((status, body)),
                        Err(e) => {
                            tracing::warn!(
                                host,
                                attempt,
                                status,
                                error = %e,
                                "failed to read error body"
                            );
                            last_error = Some(AwsError::from(e));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        host,
                        attempt,
                        max_retries = policy.max_retries,
                        elapsed_ms,
                        error = %e,
                        "transport error"
                    );
                    last_error = Some(AwsError::from(e));
                }
            }
        }

        if let Some((status, body)) = last_response {
            return decode_response(status, &body);
        }
        match last_error {
            Some(e) => Err(e),
            None => unreachable!("at least one attempt is always made"),
        }
    }
}

fn read_response<R: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<R> {
    let status = response.status().as_u16();
    let body = response.bytes()?;
    decode_response(status, &body)
}
