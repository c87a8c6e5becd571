//! Request building and signature version 2 signing.

use chrono::{DateTime, Utc};

use crate::credential::Credential;
use crate::error::Result;
use crate::params::Params;
use crate::sign::{SIGNATURE_METHOD, SIGNATURE_VERSION, percent_encode, sign, string_to_sign};

/// Formats a signing timestamp as ISO 8601 UTC with second precision.
fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// A Query API call: target host, API version, credential and parameters.
///
/// A request is signed at most once. The first call to [`Request::encode`] adds the
/// standard authentication parameters, signs, and caches the body; every later call
/// returns the cached body unchanged.
#[derive(Debug, Clone)]
pub struct Request {
    host: String,
    version: String,
    credential: Credential,
    params: Params,
    encoded: Option<String>,
}

impl Request {
    pub fn new(
        host: impl Into<String>,
        version: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            host: host.into(),
            version: version.into(),
            credential,
            params: Params::new(),
            encoded: None,
        }
    }

    /// Appends a parameter.
    ///
    /// Parameters added after the request has been signed are dropped, since they
    /// would not be covered by the signature.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if self.encoded.is_some() {
            let name = name.into();
            tracing::warn!(
                host = %self.host,
                param = %name,
                "parameter added after signing was ignored"
            );
            return self;
        }
        self.params.add(name, value);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns `true` once the request has been signed.
    pub fn is_finalized(&self) -> bool {
        self.encoded.is_some()
    }

    /// Returns the signed, form-encoded body, signing with the current time on first use.
    pub fn encode(&mut self) -> Result<String> {
        self.encode_at(Utc::now())
    }

    /// Like [`Request::encode`], signing with `now` as the timestamp if not yet signed.
    ///
    /// On error the request is left unsigned and unchanged.
    pub fn encode_at(&mut self, now: DateTime<Utc>) -> Result<String> {
        if let Some(ref body) = self.encoded {
            return Ok(body.clone());
        }

        let mut params = self.params.clone();
        params.add("AWSAccessKeyId", self.credential.access_key_id.clone());
        params.add("SignatureMethod", SIGNATURE_METHOD);
        params.add("SignatureVersion", SIGNATURE_VERSION);
        params.add("Version", self.version.clone());
        params.add("Timestamp", format_timestamp(now));
        params.sort();

        let canonical = params.encode();
        let signature = sign(
            &string_to_sign(&self.host, &canonical),
            &self.credential.secret_access_key,
        )?;

        let body = format!("{}&Signature={}", canonical, percent_encode(&signature));
        params.add("Signature", signature);
        self.params = params;
        self.encoded = Some(body.clone());
        Ok(body)
    }
}
