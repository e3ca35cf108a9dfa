//! Bearer token signing and verification.
//!
//! Tokens are compact JWS strings signed with HS512. The payload is
//! [`Claims`]: the principal's email as `sub`, its role list, and `iat`/`exp`
//! in whole Unix seconds. A token is valid while the current time is strictly
//! before `exp`; no leeway is applied.
//!
//! Because timestamps have one-second resolution, `iat` is the issue instant
//! truncated to the second and a token lives between `ttl - 1s` and `ttl`.

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use thiserror::Error;

use scholarly_config::JwtConfig;

use crate::claims::{Claims, VerifiedClaims};
use crate::roles::Role;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Expired token: {0}")]
    Expired(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid signature: {0}")]
    BadSignature(String),

    #[error("Unsupported token: {0}")]
    Unsupported(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
}

impl TokenError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Expired(_) => "expired",
            TokenError::Malformed(_) => "malformed",
            TokenError::BadSignature(_) => "bad_signature",
            TokenError::Unsupported(_) => "unsupported",
            TokenError::IllegalArgument(_) => "illegal_argument",
        }
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        let detail = err.to_string();
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired(detail),
            ErrorKind::InvalidSignature => TokenError::BadSignature(detail),
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::Unsupported(detail),
            ErrorKind::InvalidKeyFormat
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::RsaFailedSigning => TokenError::IllegalArgument(detail),
            _ => TokenError::Malformed(detail),
        }
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// Signs and verifies access tokens with a key fixed at construction.
///
/// Rotating the key means building a new codec; tokens signed with the old
/// key then fail with [`TokenError::BadSignature`].
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub const ALGORITHM: Algorithm = Algorithm::HS512;

    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is compared against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
            validation,
            ttl: config.expiration(),
        }
    }

    pub fn issue(
        &self,
        subject: &str,
        roles: &[Role],
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::IllegalArgument(
                "subject must not be empty".to_string(),
            ));
        }

        let iat = now.timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .ok_or_else(|| TokenError::IllegalArgument("ttl is out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            iat,
            exp,
        };

        Ok(encode(
            &Header::new(Self::ALGORITHM),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Issues a token at the current time with the configured lifetime.
    pub fn issue_now(&self, subject: &str, roles: &[Role]) -> Result<String, TokenError> {
        self.issue(subject, roles, Utc::now(), self.ttl)
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedClaims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::IllegalArgument(
                "token must not be empty".to_string(),
            ));
        }

        check_algorithm(token)?;

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired(format!(
                "token expired at {}",
                VerifiedClaims::new(claims).expires_at().to_rfc3339()
            )));
        }

        Ok(VerifiedClaims::new(claims))
    }

    /// Returns the subject of a token after fully verifying it.
    pub fn subject_of(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token)
            .map(|claims| claims.into_inner().sub)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Self::ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Rejects tokens that are not three segments or are not signed with HS512,
/// before any signature work happens.
fn check_algorithm(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let header = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| TokenError::Malformed(format!("header is not base64url: {e}")))?;
    let header: RawHeader = serde_json::from_slice(&header)
        .map_err(|e| TokenError::Malformed(format!("header is not valid JSON: {e}")))?;

    match header.alg.as_deref() {
        Some("HS512") => Ok(()),
        Some(other) => Err(TokenError::Unsupported(format!(
            "signing algorithm `{other}` is not accepted"
        ))),
        None => Err(TokenError::Malformed("header has no `alg`".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use chrono::TimeZone;

    fn codec_with(secret_byte: u8) -> TokenCodec {
        let secret = STANDARD.encode([secret_byte; 64]);
        TokenCodec::new(&JwtConfig::new(&secret, 60_000).unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn issued_token_carries_claims() {
        let codec = codec_with(1);
        let token = codec
            .issue("s@x.com", &[Role::Admin], t0(), Duration::from_secs(60))
            .unwrap();

        let claims = codec.verify_at(&token, t0()).unwrap();
        assert_eq!(claims.subject(), "s@x.com");
        assert_eq!(claims.roles(), &[Role::Admin]);
        assert_eq!(claims.issued_at(), t0());
        assert_eq!(claims.expires_at(), t0() + chrono::Duration::seconds(60));
    }

    #[test]
    fn valid_until_expiry_then_expired() {
        let codec = codec_with(1);
        let token = codec
            .issue("s@x.com", &[Role::User], t0(), Duration::from_secs(60))
            .unwrap();

        assert!(codec.verify_at(&token, t0()).is_ok());
        assert!(
            codec
                .verify_at(&token, t0() + chrono::Duration::milliseconds(59_999))
                .is_ok()
        );
        assert!(matches!(
            codec.verify_at(&token, t0() + chrono::Duration::seconds(60)),
            Err(TokenError::Expired(_))
        ));
        assert!(matches!(
            codec.verify_at(&token, t0() + chrono::Duration::days(1)),
            Err(TokenError::Expired(_))
        ));
    }

    #[test]
    fn issue_instant_is_truncated_to_the_second() {
        let codec = codec_with(1);
        let now = t0() + chrono::Duration::milliseconds(700);
        let token = codec
            .issue("s@x.com", &[Role::User], now, Duration::from_secs(60))
            .unwrap();

        let claims = codec.verify_at(&token, now).unwrap();
        assert_eq!(claims.issued_at(), t0());
    }

    #[test]
    fn expiry_counts_from_the_truncated_issue_instant() {
        let codec = codec_with(1);
        let issued = t0() + chrono::Duration::milliseconds(600);
        let token = codec
            .issue("s@x.com", &[Role::User], issued, Duration::from_secs(2))
            .unwrap();

        assert!(codec.verify_at(&token, t0() + chrono::Duration::seconds(1)).is_ok());
        assert!(
            codec
                .verify_at(&token, t0() + chrono::Duration::milliseconds(1_999))
                .is_ok()
        );
        // Still short of `issued + 2s`, but past the second-resolution expiry.
        let expired_at = t0() + chrono::Duration::seconds(2);
        assert!(expired_at < issued + chrono::Duration::seconds(2));
        assert!(matches!(
            codec.verify_at(&token, expired_at),
            Err(TokenError::Expired(_))
        ));
    }

    #[test]
    fn issue_now_uses_configured_ttl() {
        let codec = codec_with(1);
        let token = codec.issue_now("s@x.com", &[Role::User]).unwrap();
        let claims = codec.verify(&token).unwrap();
        let lifetime = claims.expires_at() - claims.issued_at();
        assert_eq!(lifetime, chrono::Duration::seconds(60));
    }

    #[test]
    fn subject_round_trip() {
        let codec = codec_with(1);
        let token = codec.issue_now("s@x.com", &[Role::Admin]).unwrap();
        assert_eq!(codec.subject_of(&token).unwrap(), "s@x.com");
    }

    #[test]
    fn subject_of_rejects_unverified_tokens() {
        let token = codec_with(1).issue_now("s@x.com", &[Role::Admin]).unwrap();
        assert!(matches!(
            codec_with(2).subject_of(&token),
            Err(TokenError::BadSignature(_))
        ));
    }

    #[test]
    fn other_key_is_bad_signature() {
        let token = codec_with(1)
            .issue("s@x.com", &[Role::User], t0(), Duration::from_secs(60))
            .unwrap();
        assert!(matches!(
            codec_with(2).verify_at(&token, t0()),
            Err(TokenError::BadSignature(_))
        ));
    }

    #[test]
    fn tampering_any_byte_never_verifies() {
        let codec = codec_with(1);
        let token = codec
            .issue("s@x.com", &[Role::User], t0(), Duration::from_secs(60))
            .unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            match codec.verify_at(&tampered, t0()) {
                Err(TokenError::BadSignature(_))
                | Err(TokenError::Malformed(_))
                | Err(TokenError::Unsupported(_)) => {}
                other => panic!("byte {i} tampered, got {other:?}"),
            }
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec_with(1);
        assert!(matches!(
            codec.verify_at("not-a-token", t0()),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            codec.verify_at("a.b.c", t0()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn empty_token_is_illegal_argument() {
        let codec = codec_with(1);
        assert!(matches!(
            codec.verify_at("", t0()),
            Err(TokenError::IllegalArgument(_))
        ));
        assert!(matches!(
            codec.verify_at("   ", t0()),
            Err(TokenError::IllegalArgument(_))
        ));
    }

    #[test]
    fn other_algorithm_is_unsupported() {
        let codec = codec_with(1);
        let claims = Claims {
            sub: "s@x.com".to_string(),
            roles: vec![Role::Admin],
            iat: t0().timestamp(),
            exp: t0().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&[1u8; 64]),
        )
        .unwrap();

        assert!(matches!(
            codec.verify_at(&token, t0()),
            Err(TokenError::Unsupported(_))
        ));
    }

    #[test]
    fn unsigned_token_is_unsupported() {
        let codec = codec_with(1);
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"s@x.com","roles":["ADMIN"],"iat":0,"exp":99999999999}"#);
        let token = format!("{header}.{payload}.");

        assert!(matches!(
            codec.verify_at(&token, t0()),
            Err(TokenError::Unsupported(_))
        ));
    }

    #[test]
    fn empty_subject_is_rejected_at_issue() {
        let codec = codec_with(1);
        assert!(matches!(
            codec.issue(" ", &[Role::User], t0(), Duration::from_secs(60)),
            Err(TokenError::IllegalArgument(_))
        ));
    }

    #[test]
    fn error_messages_name_the_kind() {
        assert!(TokenError::Expired("x".into()).to_string().starts_with("Expired token"));
        assert!(TokenError::BadSignature("x".into()).to_string().starts_with("Invalid signature"));
        assert_eq!(TokenError::Malformed("x".into()).kind(), "malformed");
    }

    #[test]
    fn debug_does_not_leak_keys() {
        let rendered = format!("{:?}", codec_with(9));
        assert!(rendered.contains("HS512"));
        assert!(!rendered.contains("9, 9"));
    }
}
