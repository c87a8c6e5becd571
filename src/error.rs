use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Maximum characters of a response body echoed into log lines.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// One `<Error>` entry of an AWS error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Error returned by the remote service for a single call.
///
/// Carries every `{Code, Message}` pair of the response in document order.
///
/// ```text
/// aws: ->
///     AuthFailure: "There is a problem with your secret"
///     Unavailable: "The service is unavailable"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ApiError {
    pub request_id: String,
    pub errors: Vec<ErrorDetail>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "aws: ->")?;
        for e in &self.errors {
            writeln!(f, "\t{}: {:?}", e.code, e.message)?;
        }
        Ok(())
    }
}

/// Errors that can occur when calling an AWS Query API.
#[derive(Debug, Error)]
pub enum AwsError {
    /// HTTP/network layer error from reqwest.
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// I/O failure raised by a transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with an error envelope.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Response body was not the expected XML document.
    #[error("XML deserialization error: {0}")]
    Deserialize(#[from] quick_xml::DeError),

    /// Credential not found or unreadable.
    #[error("credential error: {0}")]
    Credential(String),

    /// Signature computation error.
    #[error("signature error: {0}")]
    Signature(String),

    /// Client configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Request parameters rejected before signing.
    #[error("validation error: {0}")]
    Validation(String),

    /// The call was cancelled through its cancellation token.
    #[error("request cancelled")]
    Cancelled,
}

impl AwsError {
    /// Returns `true` for failures that happened below HTTP, before any response was seen.
    pub fn is_transport(&self) -> bool {
        matches!(self, AwsError::HttpClient(_) | AwsError::Io(_))
    }

    /// Returns `true` if the error is potentially recoverable by retrying the whole call.
    ///
    /// The executor already retries transport failures and 5xx responses; this is for
    /// callers that decide to retry at a higher level.
    pub fn is_retryable(&self) -> bool {
        match self {
            AwsError::HttpClient(e) => e.is_timeout() || e.is_connect(),
            AwsError::Io(_) => true,
            AwsError::Api(api) => api.errors.iter().any(|e| {
                matches!(
                    e.code.as_str(),
                    "ServiceUnavailable" | "RequestLimitExceeded" | "Throttling"
                ) || e.code.starts_with("Internal")
            }),
            AwsError::Deserialize(_)
            | AwsError::Credential(_)
            | AwsError::Signature(_)
            | AwsError::Config(_)
            | AwsError::Validation(_)
            | AwsError::Cancelled => false,
        }
    }

    /// Returns the request ID if this is an API error.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            AwsError::Api(api) => Some(&api.request_id),
            _ => None,
        }
    }

    /// Returns the first error code if this is an API error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            AwsError::Api(api) => api.errors.first().map(|e| e.code.as_str()),
            _ => None,
        }
    }
}

/// A specialized Result type for AWS Query operations.
pub type Result<T> = std::result::Result<T, AwsError>;

/// Truncates a string to at most `max_chars` characters on a valid UTF-8 boundary.
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
