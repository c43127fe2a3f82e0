//! Stripe webhook signature verification.
//!
//! Stripe signs each delivery with the endpoint secret:
//! - Header: `stripe-signature: t=<unix>,v1=<hex>[,v1=<hex>...]`
//! - Signed content: `{t}.{raw body}`
//! - Signature: hex-encoded HMAC-SHA256 keyed with the full `whsec_...` secret
//!
//! More than one `v1` entry appears while a secret is being rolled; any match
//! is accepted.
//!
//! This check runs before `stripe_webhook` constructs the event, so the
//! timestamp window is configurable and hostile headers are rejected with a
//! typed [`SignatureError`].

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Widest tolerance `stripe_webhook` accepts when it constructs the event.
pub const MAX_TOLERANCE_SECS: i64 = 300;

/// Errors that can occur while verifying a signature header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The header has no `t=` entry, or it is not an integer.
    #[error("missing or invalid timestamp")]
    MissingTimestamp,

    /// The header has no `v1=` entry.
    #[error("no v1 signature found")]
    MissingSignature,

    /// The timestamp is outside the tolerance window.
    #[error("timestamp outside tolerance ({age}s old)")]
    TimestampOutOfTolerance {
        /// Age of the signature in seconds (negative when from the future).
        age: i64,
    },

    /// No `v1` signature matches the expected value.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verifies `stripe-signature` headers against the endpoint secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
    tolerance_secs: i64,
}

impl SignatureVerifier {
    /// Create a verifier for `secret`, accepting signatures up to
    /// `tolerance_secs` old.
    #[must_use]
    pub const fn new(secret: SecretString, tolerance_secs: i64) -> Self {
        Self {
            secret,
            tolerance_secs,
        }
    }

    /// Verify `header` over `payload` using the current time.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError` if the header is malformed, stale, or does
    /// not match.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `header` over `payload` as of `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `SignatureError` if the header is malformed, stale, or does
    /// not match.
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
        let parsed = parse_header(header);
        let timestamp = parsed.timestamp.ok_or(SignatureError::MissingTimestamp)?;

        if parsed.signatures.is_empty() {
            return Err(SignatureError::MissingSignature);
        }

        // Saturates for timestamps near the i64 limits, which are never in range.
        let age = now.saturating_sub(timestamp);
        if age.unsigned_abs() > self.tolerance_secs.unsigned_abs() {
            return Err(SignatureError::TimestampOutOfTolerance { age });
        }

        let expected = self.compute(timestamp, payload);
        let matched = parsed
            .signatures
            .iter()
            .any(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()));

        if matched {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    /// The endpoint secret.
    pub(crate) const fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Compute the hex signature Stripe would send for `payload` at `timestamp`.
    #[must_use]
    pub fn compute(&self, timestamp: i64, payload: &[u8]) -> String {
        // HMAC accepts keys of any length, so this cannot fail.
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
        else {
            return String::new();
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Build a complete `stripe-signature` header for `payload`.
    ///
    /// Used to sign test deliveries.
    #[must_use]
    pub fn header_for(&self, timestamp: i64, payload: &[u8]) -> String {
        format!("t={timestamp},v1={}", self.compute(timestamp, payload))
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

struct ParsedHeader<'a> {
    timestamp: Option<i64>,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> ParsedHeader<'_> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    ParsedHeader {
        timestamp,
        signatures,
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from("whsec_test_secret"), 300)
    }

    #[test]
    fn test_valid_signature() {
        let v = verifier();
        let header = v.header_for(NOW, PAYLOAD);
        assert_eq!(v.verify_at(PAYLOAD, &header, NOW + 10), Ok(()));
    }

    #[test]
    fn test_signature_is_stable_hex() {
        let v = verifier();
        let sig = v.compute(NOW, b"{}");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sig, v.compute(NOW, b"{}"));
    }

    #[test]
    fn test_modified_payload_rejected() {
        let v = verifier();
        let header = v.header_for(NOW, PAYLOAD);
        assert_eq!(
            v.verify_at(br#"{"id":"evt_2"}"#, &header, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = SignatureVerifier::new(SecretString::from("whsec_other"), 300);
        let header = other.header_for(NOW, PAYLOAD);
        assert_eq!(
            verifier().verify_at(PAYLOAD, &header, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_any_v1_matches() {
        let v = verifier();
        let good = v.compute(NOW, PAYLOAD);
        let header = format!("t={NOW},v1=deadbeef,v1={good},v0=ignored");
        assert_eq!(v.verify_at(PAYLOAD, &header, NOW), Ok(()));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let v = verifier();
        let header = v.header_for(NOW, PAYLOAD);
        assert_eq!(
            v.verify_at(PAYLOAD, &header, NOW + 301),
            Err(SignatureError::TimestampOutOfTolerance { age: 301 })
        );
    }

    #[test]
    fn test_missing_parts() {
        let v = verifier();
        assert_eq!(
            v.verify_at(PAYLOAD, "v1=abc", NOW),
            Err(SignatureError::MissingTimestamp)
        );
        assert_eq!(
            v.verify_at(PAYLOAD, &format!("t={NOW}"), NOW),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            v.verify_at(PAYLOAD, "garbage", NOW),
            Err(SignatureError::MissingTimestamp)
        );
        assert_eq!(
            v.verify_at(b"{}", "t=-9223372036854775808,v1=00", NOW),
            Err(SignatureError::TimestampOutOfTolerance { age: i64::MAX })
        );
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        let v = verifier();
        assert_eq!(
            v.verify_at(PAYLOAD, "t=9223372036854775807,v1=00", -NOW),
            Err(SignatureError::TimestampOutOfTolerance { age: i64::MIN })
        );
        assert_eq!(
            v.verify_at(PAYLOAD, "t=-9223372036854775808,v1=00", i64::MAX),
            Err(SignatureError::TimestampOutOfTolerance { age: i64::MAX })
        );
    }

    #[test]
    fn test_future_timestamp_within_tolerance() {
        let v = verifier();
        let header = v.header_for(NOW + 60, PAYLOAD);
        assert_eq!(v.verify_at(PAYLOAD, &header, NOW), Ok(()));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
