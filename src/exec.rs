//! Common execution utilities for async and blocking clients.

use serde::de::DeserializeOwned;

use crate::error::{AwsError, MAX_ERROR_BODY_CHARS, Result, truncate_str};
use crate::response::ApiErrorResponse;
use crate::transport::TransportResponse;

/// The only status decoded as a success.
const STATUS_OK: u16 = 200;

/// Deserializes an XML body, logging a truncated copy of it on failure.
fn parse_xml<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    quick_xml::de::from_reader(body).map_err(|e| {
        let text = String::from_utf8_lossy(body);
        tracing::warn!(
            status,
            body = truncate_str(&text, MAX_ERROR_BODY_CHARS),
            error = %e,
            "failed to parse response"
        );
        AwsError::from(e)
    })
}

/// Decodes a fully read response.
///
/// `200` deserializes into `T`; any other status deserializes the error envelope and
/// returns it as [`AwsError::Api`].
pub(crate) fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    if status == STATUS_OK {
        return parse_xml(status, body);
    }
    let envelope: ApiErrorResponse = parse_xml(status, body)?;
    Err(AwsError::Api(envelope.into()))
}

/// Reads the body in one buffered read, then decodes it.
pub(crate) async fn read_response<T, R>(response: R) -> Result<T>
where
    T: DeserializeOwned,
    R: TransportResponse,
{
    let status = response.status();
    let body = response.into_body().await?;
    decode_response(status, &body)
}
