//! Svix-style webhook signature verification.
//!
//! The sender signs `"{svix-id}.{svix-timestamp}.{body}"` with
//! HMAC-SHA256 keyed by the base64 part of a `whsec_` secret and sends
//! one or more space separated `v1,<base64 signature>` entries in the
//! `svix-signature` header.

use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::GreenifyError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum distance between the signed timestamp and now, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

const SECRET_PREFIX: &str = "whsec_";

/// The three signature headers of a webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// `svix-id`.
    pub id: String,
    /// `svix-timestamp` (unix seconds).
    pub timestamp: String,
    /// `svix-signature`.
    pub signature: String,
}

impl SignatureHeaders {
    /// Reads the headers from a request.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::MissingSignatureHeaders`] if any header is
    /// absent, empty, or not valid text.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, GreenifyError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(GreenifyError::MissingSignatureHeaders)
        };
        Ok(Self {
            id: get("svix-id")?,
            timestamp: get("svix-timestamp")?,
            signature: get("svix-signature")?,
        })
    }
}

/// Verifies webhook signatures for one signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Builds a verifier from a `whsec_<base64>` secret. A secret without
    /// the prefix is decoded as plain base64.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::Internal`] if the secret is not base64.
    pub fn from_secret(secret: &str) -> Result<Self, GreenifyError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
        let key = STANDARD
            .decode(encoded)
            .map_err(|e| GreenifyError::Internal(format!("webhook secret is not base64: {e}")))?;
        Ok(Self { key })
    }

    /// Checks `body` against the headers using the current clock.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidSignature`] when no signature
    /// matches or the timestamp is outside the tolerance window.
    pub fn verify(&self, headers: &SignatureHeaders, body: &[u8]) -> Result<(), GreenifyError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    fn verify_at(
        &self,
        headers: &SignatureHeaders,
        body: &[u8],
        now: i64,
    ) -> Result<(), GreenifyError> {
        let ts: i64 = headers
            .timestamp
            .parse()
            .map_err(|_| GreenifyError::InvalidSignature)?;
        if now.abs_diff(ts) > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
            tracing::warn!(svix_id = %headers.id, ts, now, "webhook timestamp outside tolerance");
            return Err(GreenifyError::InvalidSignature);
        }

        for entry in headers.signature.split_whitespace() {
            let Some(("v1", encoded)) = entry.split_once(',') else {
                continue;
            };
            let Ok(candidate) = STANDARD.decode(encoded) else {
                continue;
            };
            let mac = self.mac(&headers.id, &headers.timestamp, body)?;
            if mac.verify_slice(&candidate).is_ok() {
                return Ok(());
            }
        }

        tracing::warn!(svix_id = %headers.id, "webhook signature mismatch");
        Err(GreenifyError::InvalidSignature)
    }

    /// Produces the `v1,<signature>` header entry for a payload.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::Internal`] if the MAC cannot be keyed.
    pub fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> Result<String, GreenifyError> {
        let tag = self.mac(id, timestamp, body)?.finalize().into_bytes();
        Ok(format!("v1,{}", STANDARD.encode(tag)))
    }

    fn mac(&self, id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, GreenifyError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| GreenifyError::Internal(format!("hmac key: {e}")))?;
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const BODY: &[u8] = br#"{"type":"user.created","data":{"id":"user_1"}}"#;

    fn verifier() -> WebhookVerifier {
        let Ok(v) = WebhookVerifier::from_secret(SECRET) else {
            panic!("secret should decode");
        };
        v
    }

    fn signed(ts: i64) -> SignatureHeaders {
        let timestamp = ts.to_string();
        let Ok(signature) = verifier().sign("msg_1", &timestamp, BODY) else {
            panic!("sign failed");
        };
        SignatureHeaders {
            id: "msg_1".to_string(),
            timestamp,
            signature,
        }
    }

    #[test]
    fn accepts_valid_signature() {
        let now = 1_700_000_000;
        assert!(verifier().verify_at(&signed(now), BODY, now + 10).is_ok());
    }

    #[test]
    fn accepts_any_matching_entry() {
        let now = 1_700_000_000;
        let mut headers = signed(now);
        headers.signature = format!("v1,AAAA v2,zzz {}", headers.signature);
        assert!(verifier().verify_at(&headers, BODY, now).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let now = 1_700_000_000;
        let result = verifier().verify_at(&signed(now), b"{}", now);
        assert!(matches!(result, Err(GreenifyError::InvalidSignature)));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let now = 1_700_000_000;
        let headers = signed(now - TIMESTAMP_TOLERANCE_SECS - 1);
        assert!(verifier().verify_at(&headers, BODY, now).is_err());
        let future = signed(now + TIMESTAMP_TOLERANCE_SECS + 1);
        assert!(verifier().verify_at(&future, BODY, now).is_err());
    }

    #[test]
    fn extreme_timestamps_are_rejected_not_overflowed() {
        let now = 1_700_000_000;
        for ts in [i64::MIN, i64::MAX] {
            let headers = SignatureHeaders {
                id: "msg_1".to_string(),
                timestamp: ts.to_string(),
                signature: "v1,AAAA".to_string(),
            };
            assert!(matches!(
                verifier().verify_at(&headers, BODY, now),
                Err(GreenifyError::InvalidSignature)
            ));
        }
    }

    #[test]
    fn rejects_other_secret() {
        let now = 1_700_000_000;
        let Ok(other) = WebhookVerifier::from_secret("whsec_c2VjcmV0LWtleS0y") else {
            panic!("secret should decode");
        };
        assert!(other.verify_at(&signed(now), BODY, now).is_err());
    }

    #[test]
    fn bad_secret_is_internal_error() {
        assert!(matches!(
            WebhookVerifier::from_secret("whsec_***"),
            Err(GreenifyError::Internal(_))
        ));
    }

    #[test]
    fn missing_header_is_reported() {
        let mut headers = HeaderMap::new();
        headers.insert("svix-id", HeaderValue::from_static("msg_1"));
        headers.insert("svix-timestamp", HeaderValue::from_static("1700000000"));
        assert!(matches!(
            SignatureHeaders::from_headers(&headers),
            Err(GreenifyError::MissingSignatureHeaders)
        ));
        headers.insert("svix-signature", HeaderValue::from_static("v1,abc"));
        assert!(SignatureHeaders::from_headers(&headers).is_ok());
    }
}
