use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt digest.
///
/// A digest that cannot be parsed never matches; callers treat it exactly
/// like a wrong password.
pub fn verify_password(password: &str, digest: &str) -> bool {
    verify(password, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash_password("correct horse").unwrap();
        assert_ne!(digest, "correct horse");
        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("battery staple", &digest));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_does_not_match() {
        assert!(!verify_password("pw", "not-a-bcrypt-digest"));
        assert!(!verify_password("pw", ""));
    }
}
