use std::time::Instant;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::config::ClientConfig;
use crate::credential::{ChainProvider, Credential, CredentialProvider};
use crate::error::{AwsError, Result};
use crate::exec::{decode_response, read_response};
use crate::request::Request;
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Async client for the AWS Query APIs.
///
/// Every call signs its request once, then posts it up to `max_retries + 1` times:
/// transport failures and 5xx responses are retried with backoff, anything else is
/// decoded and returned.
pub struct Client<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
    credential: Credential,
}

impl Client {
    /// Creates a new client with an explicit credential.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Creates a new client with an explicit credential and custom configuration.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(credential, config, transport))
    }

    /// Creates a new client from the default credential chain (env vars → profile file)
    /// and `AWS_MAX_RETRIES`.
    pub fn from_env() -> Result<Self> {
        let credential = ChainProvider::default_chain().resolve()?;
        Self::with_config(credential, ClientConfig::from_env())
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client over a custom transport.
    pub fn with_transport(credential: Credential, config: ClientConfig, transport: T) -> Self {
        Self {
            transport,
            config,
            credential,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Starts an unsigned request signed with this client's credential.
    pub fn new_request(&self, host: impl Into<String>, version: impl Into<String>) -> Request {
        Request::new(host, version, self.credential.clone())
    }

    /// Executes a typed action.
    pub async fn call<A: Action>(&self, action: &A) -> Result<A::Response> {
        self.call_with_cancel(action, &CancellationToken::new()).await
    }

    /// Executes a typed action, aborting when `cancel` fires.
    pub async fn call_with_cancel<A: Action>(
        &self,
        action: &A,
        cancel: &CancellationToken,
    ) -> Result<A::Response> {
        let request = action.to_request(&self.credential)?;
        self.send_with_cancel(request, cancel).await
    }

    /// Signs (if needed), posts and decodes `request`.
    pub async fn send<R: DeserializeOwned>(&self, request: Request) -> Result<R> {
        self.send_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`Client::send`]; `cancel` aborts an in-flight attempt or a pending backoff.
    pub async fn send_with_cancel<R: DeserializeOwned>(
        &self,
        mut request: Request,
        cancel: &CancellationToken,
    ) -> Result<R> {
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
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(AwsError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let start = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AwsError::Cancelled),
                result = self.transport.post(&url, body.clone()) => result,
            };
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(response) if RetryPolicy::is_final_status(response.status()) => {
                    tracing::debug!(
                        host,
                        attempt,
                        status = response.status(),
                        elapsed_ms,
                        "response received"
                    );
                    return read_response(response).await;
                }
                Ok(response) => {
                    let status = response.status();
                    tracing::warn!(
                        host,
                        attempt,
                        max_retries = policy.max_retries,
                        status,
                        elapsed_ms,
                        "server error"
                    );
                    // Buffered now so a later attempt's timeout cannot fail the read.
                    let read = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(AwsError::Cancelled),
                        read = response.into_body() => read,
                    };
                    match read {
                        Ok(body) => last_response = Some((status, body)),
                        Err(e) => {
                            tracing::warn!(
                                host,
                                attempt,
                                status,
                                error = %e,
                                "failed to read error body"
                            );
                            last_error = Some(e);
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
                    last_error = Some(e);
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
