//! # Scholarly Auth
//!
//! Authentication primitives for the Scholarly API.
//!
//! - [`roles`]: the closed set of roles a principal can hold
//! - [`claims`]: token payload and the verified-claims wrapper
//! - [`jwt`]: [`TokenCodec`], which signs and verifies bearer tokens
//!
//! Claims can only be read out of a token through [`VerifiedClaims`], which is
//! produced exclusively by [`TokenCodec::verify`]. There is no way to pull a
//! subject out of an unverified string.
//!
//! # Example
//!
//! ```ignore
//! use scholarly_auth::{Role, TokenCodec};
//! use scholarly_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env()?);
//! let token = codec.issue_now("ada@example.com", &[Role::Admin])?;
//! let claims = codec.verify(&token)?;
//! assert_eq!(claims.subject(), "ada@example.com");
//! ```

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{Claims, VerifiedClaims};
pub use jwt::{TokenCodec, TokenError};
pub use roles::{Role, UnknownRole};
