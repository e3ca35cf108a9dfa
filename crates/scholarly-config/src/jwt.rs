use std::env;
use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::ConfigError;

/// Signing configuration for access tokens.
///
/// `JWT_SECRET` holds the base64-encoded HMAC key. HS512 needs at least
/// [`JwtConfig::MIN_SECRET_BYTES`] bytes once decoded. `JWT_EXPIRATION_MS` is
/// the token lifetime in milliseconds.
#[derive(Clone)]
pub struct JwtConfig {
    secret: Vec<u8>,
    expiration: Duration,
}

impl JwtConfig {
    pub const MIN_SECRET_BYTES: usize = 64;
    pub const DEFAULT_EXPIRATION_MS: u64 = 3_600_000;
    pub const MIN_EXPIRATION_MS: u64 = 1_000;

    pub fn new(encoded_secret: &str, expiration_ms: u64) -> Result<Self, ConfigError> {
        let secret = STANDARD
            .decode(encoded_secret.trim())
            .map_err(|e| ConfigError::invalid("JWT_SECRET", format!("not valid base64: {e}")))?;

        if secret.len() < Self::MIN_SECRET_BYTES {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!(
                    "decodes to {} bytes, at least {} are required",
                    secret.len(),
                    Self::MIN_SECRET_BYTES
                ),
            ));
        }

        if expiration_ms < Self::MIN_EXPIRATION_MS {
            return Err(ConfigError::invalid(
                "JWT_EXPIRATION_MS",
                format!("must be at least {} ms", Self::MIN_EXPIRATION_MS),
            ));
        }

        Ok(Self {
            secret,
            expiration: Duration::from_millis(expiration_ms),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        let expiration_ms = match env::var("JWT_EXPIRATION_MS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("JWT_EXPIRATION_MS", "expected milliseconds"))?,
            Err(_) => Self::DEFAULT_EXPIRATION_MS,
        };

        Self::new(&secret, expiration_ms)
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("expiration", &self.expiration)
            .finish()
    }
}
