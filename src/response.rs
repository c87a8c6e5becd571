use serde::Deserialize;

use crate::error::{ApiError, ErrorDetail};

/// `ResponseMetadata` block carried by every SimpleDB response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseMetadata {
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
    /// Machine utilization charged for the call, passed through as reported.
    #[serde(rename = "BoxUsage", default)]
    pub box_usage: f64,
}

/// Wrapper for EC2's `<xxxSet><item>…</item></xxxSet>` lists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemSet<T> {
    #[serde(rename = "item", default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ItemSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// AWS Query API error envelope:
/// `<Response><Errors><Error><Code/><Message/></Error>…</Errors><RequestID/></Response>`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "RequestID", alias = "RequestId", default)]
    pub request_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorList {
    #[serde(rename = "Error", default)]
    pub items: Vec<ErrorDetail>,
}

impl From<ApiErrorResponse> for ApiError {
    fn from(resp: ApiErrorResponse) -> Self {
        ApiError {
            request_id: resp.request_id,
            errors: resp.errors.items,
        }
    }
}
