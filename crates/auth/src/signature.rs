//! Signed-header verification for requests relayed by the trusted frontend.
//!
//! The frontend signs `"{user_id}:{timestamp}:{tier}"` with HMAC-SHA256 under a
//! shared secret and sends the lowercase hex digest in `X-Signature`.
//!
//! Known limitations of the scheme, kept as-is:
//! - Freshness is age-based only. No nonce or replay cache exists, so a captured
//!   request can be replayed until its timestamp ages past the skew window.
//! - Timestamps in the future are accepted without bound.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use formgate_core::{PlanTier, UserId};

use crate::{TierSource, VerifiedAssertion};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_TIMESTAMP: &str = "x-timestamp";
pub const HEADER_SIGNATURE: &str = "x-signature";
pub const HEADER_PLAN_TIER: &str = "x-plan-tier";

/// Default tolerated age of a signed timestamp.
pub const DEFAULT_SKEW_SECS: i64 = 300;

/// Raw header values as received (transport-agnostic).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignedHeaders<'a> {
    pub user_id: Option<&'a str>,
    pub timestamp: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub plan_tier: Option<&'a str>,
}

/// Shared secret and freshness tolerance.
#[derive(Clone)]
pub struct VerifierConfig {
    secret: String,
    skew: Duration,
}

impl VerifierConfig {
    pub fn new(secret: impl Into<String>, skew: Duration) -> Self {
        Self {
            secret: secret.into(),
            skew,
        }
    }

    pub fn with_default_skew(secret: impl Into<String>) -> Self {
        Self::new(secret, Duration::seconds(DEFAULT_SKEW_SECS))
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn skew(&self) -> Duration {
        self.skew
    }
}

impl core::fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("secret", &"<redacted>")
            .field("skew", &self.skew)
            .finish()
    }
}

/// Why a signed request was rejected.
///
/// Only for server-side diagnostics: callers must collapse every variant into
/// one uniform "unauthorized" answer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("missing identity headers")]
    MissingHeaders,

    #[error("signing secret is not configured")]
    EmptySecret,

    #[error("unknown plan tier asserted")]
    InvalidPlanTier,

    #[error("timestamp is neither RFC3339 nor unix seconds")]
    TimestampParseError,

    #[error("timestamp is older than the allowed skew")]
    TimestampTooOld,

    #[error("signature is not hex encoded")]
    SignatureNotHex,

    #[error("signature does not match")]
    SignatureMismatch,
}

impl AuthFailure {
    /// Stable reason code for audit logs.
    pub const fn reason(self) -> &'static str {
        match self {
            AuthFailure::MissingHeaders => "missing_headers",
            AuthFailure::EmptySecret => "empty_secret",
            AuthFailure::InvalidPlanTier => "invalid_plan_tier",
            AuthFailure::TimestampParseError => "timestamp_parse_error",
            AuthFailure::TimestampTooOld => "timestamp_too_old",
            AuthFailure::SignatureNotHex => "signature_not_hex",
            AuthFailure::SignatureMismatch => "signature_mismatch",
        }
    }
}

/// Verify signed headers against the wall clock.
pub fn verify(headers: &SignedHeaders<'_>, config: &VerifierConfig) -> Result<VerifiedAssertion, AuthFailure> {
    verify_at(headers, config, Utc::now())
}

/// Verify signed headers as of `now`.
///
/// - No IO
/// - No panics
pub fn verify_at(
    headers: &SignedHeaders<'_>,
    config: &VerifierConfig,
    now: DateTime<Utc>,
) -> Result<VerifiedAssertion, AuthFailure> {
    let (tier, tier_source) = match headers.plan_tier {
        None | Some("") => (PlanTier::lowest(), TierSource::Defaulted),
        Some(raw) => {
            let tier = raw.parse::<PlanTier>().map_err(|_| AuthFailure::InvalidPlanTier)?;
            (tier, TierSource::Asserted)
        }
    };

    let user_id = non_empty(headers.user_id)?;
    let raw_timestamp = non_empty(headers.timestamp)?;
    let signature = non_empty(headers.signature)?;

    if config.secret.is_empty() {
        return Err(AuthFailure::EmptySecret);
    }

    let payload = canonical_payload(user_id, raw_timestamp, tier);
    let expected = hmac_digest(config.secret.as_bytes(), payload.as_bytes())?;
    let provided = hex::decode(signature).map_err(|_| AuthFailure::SignatureNotHex)?;
    if !constant_time_eq(&provided, &expected) {
        return Err(AuthFailure::SignatureMismatch);
    }

    let timestamp = parse_timestamp(raw_timestamp)?;
    if now - timestamp > config.skew {
        return Err(AuthFailure::TimestampTooOld);
    }

    let user_id = UserId::parse(user_id).map_err(|_| AuthFailure::MissingHeaders)?;
    Ok(VerifiedAssertion {
        user_id,
        tier,
        tier_source,
        verified_at: now,
    })
}

/// The exact byte string covered by the signature.
///
/// The timestamp is used verbatim as received, never re-formatted.
pub fn canonical_payload(user_id: &str, raw_timestamp: &str, tier: PlanTier) -> String {
    format!("{user_id}:{raw_timestamp}:{}", tier.as_str())
}

/// Lowercase hex HMAC-SHA256 of `payload`, as the trusted frontend produces it.
pub fn sign(secret: &str, payload: &str) -> Result<String, AuthFailure> {
    if secret.is_empty() {
        return Err(AuthFailure::EmptySecret);
    }
    Ok(hex::encode(hmac_digest(secret.as_bytes(), payload.as_bytes())?))
}

/// Timing-safe equality: lengths first, then every byte without early exit.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

fn hmac_digest(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>, AuthFailure> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthFailure::EmptySecret)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn non_empty(value: Option<&str>) -> Result<&str, AuthFailure> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthFailure::MissingHeaders),
    }
}

/// RFC3339 first, then integer unix seconds.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AuthFailure> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(AuthFailure::TimestampParseError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use subtle::ConstantTimeEq;

    const SECRET: &str = "s3cret";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn config() -> VerifierConfig {
        VerifierConfig::new(SECRET, Duration::seconds(300))
    }

    fn signed(user_id: &str, timestamp: &str, tier: PlanTier) -> String {
        sign(SECRET, &canonical_payload(user_id, timestamp, tier)).unwrap()
    }

    fn headers<'a>(user_id: &'a str, timestamp: &'a str, signature: &'a str, tier: Option<&'a str>) -> SignedHeaders<'a> {
        SignedHeaders {
            user_id: Some(user_id),
            timestamp: Some(timestamp),
            signature: Some(signature),
            plan_tier: tier,
        }
    }

    #[test]
    fn defaulted_tier_scenario() {
        let ts = now().timestamp().to_string();
        let payload = format!("42:{ts}:free");
        let signature = sign(SECRET, &payload).unwrap();

        let verified = verify_at(&headers("42", &ts, &signature, None), &config(), now()).unwrap();
        assert_eq!(verified.user_id.as_str(), "42");
        assert_eq!(verified.tier, PlanTier::Free);
        assert!(verified.tier_defaulted());
        assert_eq!(verified.verified_at, now());
    }

    #[test]
    fn flipping_any_hex_character_is_rejected() {
        let ts = now().timestamp().to_string();
        let signature = signed("42", &ts, PlanTier::Free);

        for i in 0..signature.len() {
            let mut chars: Vec<char> = signature.chars().collect();
            chars[i] = if chars[i] == '0' { '1' } else { '0' };
            let forged: String = chars.into_iter().collect();

            let err = verify_at(&headers("42", &ts, &forged, None), &config(), now()).unwrap_err();
            assert_eq!(err, AuthFailure::SignatureMismatch, "position {i}");
        }
    }

    #[test]
    fn asserted_tier_is_returned_and_bound_into_the_signature() {
        let ts = now().to_rfc3339();
        let signature = signed("user_1", &ts, PlanTier::Business);

        let verified = verify_at(&headers("user_1", &ts, &signature, Some("business")), &config(), now()).unwrap();
        assert_eq!(verified.tier, PlanTier::Business);
        assert_eq!(verified.tier_source, TierSource::Asserted);

        // Same signature, upgraded tier claim.
        let err = verify_at(&headers("user_1", &ts, &signature, Some("enterprise")), &config(), now()).unwrap_err();
        assert_eq!(err, AuthFailure::SignatureMismatch);
    }

    #[test]
    fn every_known_tier_verifies() {
        let ts = now().timestamp().to_string();
        for tier in PlanTier::ALL {
            let signature = signed("u", &ts, tier);
            let verified = verify_at(&headers("u", &ts, &signature, Some(tier.as_str())), &config(), now()).unwrap();
            assert_eq!(verified.tier, tier);
        }
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let ts = now().timestamp().to_string();
        let signature = signed("u", &ts, PlanTier::Free);
        let err = verify_at(&headers("u", &ts, &signature, Some("platinum")), &config(), now()).unwrap_err();
        assert_eq!(err, AuthFailure::InvalidPlanTier);
        assert_eq!(err.reason(), "invalid_plan_tier");
    }

    #[test]
    fn empty_tier_header_counts_as_absent() {
        let ts = now().timestamp().to_string();
        let signature = signed("u", &ts, PlanTier::Free);
        let verified = verify_at(&headers("u", &ts, &signature, Some("")), &config(), now()).unwrap();
        assert_eq!(verified.tier_source, TierSource::Defaulted);
    }

    #[test]
    fn missing_or_empty_headers_are_rejected() {
        let cfg = config();
        let missing = [
            SignedHeaders { user_id: None, timestamp: Some("1"), signature: Some("ab"), plan_tier: None },
            SignedHeaders { user_id: Some("u"), timestamp: None, signature: Some("ab"), plan_tier: None },
            SignedHeaders { user_id: Some("u"), timestamp: Some("1"), signature: None, plan_tier: None },
            SignedHeaders { user_id: Some(""), timestamp: Some("1"), signature: Some("ab"), plan_tier: None },
            SignedHeaders::default(),
        ];
        for h in missing {
            assert_eq!(verify_at(&h, &cfg, now()).unwrap_err(), AuthFailure::MissingHeaders);
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        let ts = now().timestamp().to_string();
        let signature = signed("u", &ts, PlanTier::Free);
        let cfg = VerifierConfig::new("", Duration::seconds(300));
        assert_eq!(
            verify_at(&headers("u", &ts, &signature, None), &cfg, now()).unwrap_err(),
            AuthFailure::EmptySecret
        );
        assert_eq!(sign("", "payload").unwrap_err(), AuthFailure::EmptySecret);
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        let ts = now().timestamp().to_string();
        for bad in ["zz", "abc", "not a signature"] {
            assert_eq!(
                verify_at(&headers("u", &ts, bad, None), &config(), now()).unwrap_err(),
                AuthFailure::SignatureNotHex
            );
        }
    }

    #[test]
    fn truncated_signature_is_a_mismatch_not_a_panic() {
        let ts = now().timestamp().to_string();
        let signature = signed("u", &ts, PlanTier::Free);
        let truncated = &signature[..signature.len() - 2];
        assert_eq!(
            verify_at(&headers("u", &ts, truncated, None), &config(), now()).unwrap_err(),
            AuthFailure::SignatureMismatch
        );
    }

    #[test]
    fn unparseable_timestamp_is_rejected() {
        for ts in ["yesterday", "2026-03-14", "12.5"] {
            let signature = signed("u", ts, PlanTier::Free);
            assert_eq!(
                verify_at(&headers("u", ts, &signature, None), &config(), now()).unwrap_err(),
                AuthFailure::TimestampParseError,
                "{ts}"
            );
        }
    }

    #[test]
    fn skew_boundary_is_inclusive() {
        let at_boundary = (now() - Duration::seconds(300)).timestamp().to_string();
        let signature = signed("u", &at_boundary, PlanTier::Free);
        assert!(verify_at(&headers("u", &at_boundary, &signature, None), &config(), now()).is_ok());

        let too_old = (now() - Duration::seconds(301)).timestamp().to_string();
        let signature = signed("u", &too_old, PlanTier::Free);
        assert_eq!(
            verify_at(&headers("u", &too_old, &signature, None), &config(), now()).unwrap_err(),
            AuthFailure::TimestampTooOld
        );
    }

    #[test]
    fn rfc3339_with_offset_is_normalized() {
        let ts = "2026-03-14T13:59:00+02:00"; // 11:59:00Z, 60s old
        let signature = signed("u", ts, PlanTier::Free);
        assert!(verify_at(&headers("u", ts, &signature, None), &config(), now()).is_ok());
    }

    #[test]
    fn future_timestamps_are_accepted() {
        let future = (now() + Duration::days(365)).timestamp().to_string();
        let signature = signed("u", &future, PlanTier::Free);
        assert!(verify_at(&headers("u", &future, &signature, None), &config(), now()).is_ok());
    }

    #[test]
    fn constant_time_eq_checks_length_then_all_bytes() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
        assert!(!constant_time_eq(b"abcd", b"xbcd"));
        assert!(!constant_time_eq(b"abcd", b"abcx"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn digest_comparison_is_subtle_backed_and_covers_both_ends() {
        // Compile-time: the compared type goes through `subtle`, not `PartialEq`.
        fn compared_with_subtle<T: ConstantTimeEq + ?Sized>(_: &T) {}

        let ts = now().timestamp().to_string();
        let expected = hex::decode(signed("42", &ts, PlanTier::Free)).unwrap();
        compared_with_subtle(expected.as_slice());

        for pos in [0, expected.len() - 1] {
            let mut forged = expected.clone();
            forged[pos] ^= 0x01;
            assert_eq!(forged.len(), expected.len());

            assert!(!bool::from(forged.as_slice().ct_eq(expected.as_slice())), "byte {pos}");
            assert!(!constant_time_eq(&forged, &expected), "byte {pos}");

            let forged_hex = hex::encode(&forged);
            let err = verify_at(&headers("42", &ts, &forged_hex, None), &config(), now()).unwrap_err();
            assert_eq!(err, AuthFailure::SignatureMismatch, "byte {pos}");
        }
    }

    #[test]
    fn config_debug_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn reason_codes_are_stable() {
        let all = [
            (AuthFailure::MissingHeaders, "missing_headers"),
            (AuthFailure::EmptySecret, "empty_secret"),
            (AuthFailure::InvalidPlanTier, "invalid_plan_tier"),
            (AuthFailure::TimestampParseError, "timestamp_parse_error"),
            (AuthFailure::TimestampTooOld, "timestamp_too_old"),
            (AuthFailure::SignatureNotHex, "signature_not_hex"),
            (AuthFailure::SignatureMismatch, "signature_mismatch"),
        ];
        for (failure, code) in all {
            assert_eq!(failure.reason(), code);
        }
    }
}
