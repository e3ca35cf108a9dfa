use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Signed payload of an access token. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

/// Claims whose signature and expiry have been checked.
///
/// Only [`crate::TokenCodec`] can construct this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims(Claims);

impl VerifiedClaims {
    pub(crate) fn new(claims: Claims) -> Self {
        Self(claims)
    }

    pub fn subject(&self) -> &str {
        &self.0.sub
    }

    pub fn roles(&self) -> &[Role] {
        &self.0.roles
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp(self.0.iat)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.0.exp)
    }

    pub fn into_inner(self) -> Claims {
        self.0
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
