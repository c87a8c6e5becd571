use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AwsError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Value of the `SignatureMethod` parameter.
pub(crate) const SIGNATURE_METHOD: &str = "HmacSHA256";

/// Value of the `SignatureVersion` parameter.
pub(crate) const SIGNATURE_VERSION: &str = "2";

/// Percent-encodes a string per RFC 3986.
///
/// Unreserved characters (A-Z, a-z, 0-9, '-', '.', '_', '~') are NOT encoded.
/// All other bytes are encoded as `%XX` (uppercase hex).
/// Spaces become `%20` (NOT `+`).
pub fn percent_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    encoded
}

/// Builds the signature version 2 string to sign:
/// `POST\n{host}\n/\n{canonical_query}`.
pub(crate) fn string_to_sign(host: &str, canonical_query: &str) -> String {
    ["POST", host, "/", canonical_query].join("\n")
}

/// HMAC-SHA256 over `string_to_sign` keyed by the secret, base64 encoded.
pub(crate) fn sign(string_to_sign: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AwsError::Signature(format!("HMAC key error: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent_decode(s: &str) -> String {
        let bytes = s.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
                out.push(u8::from_str_radix(hex, 16).unwrap());
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn percent_encode_unreserved_chars() {
        assert_eq!(percent_encode("abcXYZ019"), "abcXYZ019");
        assert_eq!(percent_encode("-._~"), "-._~");
    }

    #[test]
    fn percent_encode_empty() {
        assert_eq!(percent_encode(""), "");
    }

    #[test]
    fn percent_encode_spaces() {
        assert_eq!(percent_encode("65 degrees"), "65%20degrees");
    }

    #[test]
    fn percent_encode_special_chars() {
        assert_eq!(percent_encode("/"), "%2F");
        assert_eq!(percent_encode("="), "%3D");
        assert_eq!(percent_encode("&"), "%26");
        assert_eq!(percent_encode("+"), "%2B");
        assert_eq!(percent_encode("*"), "%2A");
        assert_eq!(percent_encode(":"), "%3A");
        assert_eq!(percent_encode("`"), "%60");
    }

    #[test]
    fn percent_encode_uses_uppercase_hex() {
        assert_eq!(percent_encode("\u{ff}"), "%C3%BF");
        assert_eq!(percent_encode("\n"), "%0A");
    }

    #[test]
    fn percent_encode_multibyte() {
        assert_eq!(percent_encode("中文"), "%E4%B8%AD%E6%96%87");
    }

    #[test]
    fn percent_encode_round_trips() {
        let inputs = [
            "",
            "plain",
            "select * from `aws-test-domain` where temp > '58'",
            "a+b=c&d/e?f#g",
            "tab\tnewline\n",
            "ünïcødé ☃",
            "2012-01-01T00:00:00Z",
        ];
        for input in inputs {
            let encoded = percent_encode(input);
            assert_eq!(percent_decode(&encoded), input);
            assert!(
                encoded
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b"-._~%".contains(&b)),
                "unexpected byte in {encoded}"
            );
        }
    }

    #[test]
    fn string_to_sign_layout() {
        assert_eq!(
            string_to_sign("sdb.amazonaws.com", "A=1&B=2"),
            "POST\nsdb.amazonaws.com\n/\nA=1&B=2"
        );
    }

    #[test]
    fn sign_known_vector() {
        let query = "AWSAccessKeyId=AK&Action=ListDomains&SignatureMethod=HmacSHA256\
                     &SignatureVersion=2&Timestamp=2012-01-01T00%3A00%3A00Z&Version=2009-04-15";
        let sig = sign(&string_to_sign("sdb.amazonaws.com", query), "SECRET").unwrap();
        assert_eq!(sig, "PyUl4iXY+S9tEvzaxO8Xh+eVsb5L2V0o63T/XlKesuk=");
    }

    #[test]
    fn sign_different_secrets_differ() {
        let data = string_to_sign("ec2.amazonaws.com", "Action=DescribeInstances");
        assert_ne!(
            sign(&data, "secret1").unwrap(),
            sign(&data, "secret2").unwrap()
        );
    }

    #[test]
    fn sign_empty_secret_still_signs() {
        let data = string_to_sign("ec2.amazonaws.com", "Action=DescribeInstances");
        let sig = sign(&data, "").unwrap();
        assert!(BASE64.decode(&sig).is_ok());
        assert_eq!(BASE64.decode(&sig).unwrap().len(), 32);
    }
}
