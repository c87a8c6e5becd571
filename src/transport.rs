//! HTTP transport seam used by the async client.

use std::future::Future;

use crate::config::ClientConfig;
use crate::error::{AwsError, Result};

/// Content type of every Query API request. SimpleDB rejects the signature without
/// the charset.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// A response whose body has not been read yet.
pub trait TransportResponse: Send {
    fn status(&self) -> u16;

    /// Reads the whole body.
    fn into_body(self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Issues form-encoded POST requests.
///
/// An `Err` from [`Transport::post`] means no response was received and the
/// attempt may be retried.
pub trait Transport: Send + Sync {
    type Response: TransportResponse;

    fn post(&self, url: &str, body: String) -> impl Future<Output = Result<Self::Response>> + Send;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AwsError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    /// Wraps an existing reqwest client.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    type Response = reqwest::Response;

    fn post(&self, url: &str, body: String) -> impl Future<Output = Result<Self::Response>> + Send {
        let pending = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send();
        async move { Ok(pending.await?) }
    }
}

impl TransportResponse for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    fn into_body(self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move { Ok(self.bytes().await?.to_vec()) }
    }
}
