//! # Scholarly Config
//!
//! Configuration types for the Scholarly API, loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and lifetime
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP settings for outbound notifications
//! - [`database`]: connection string and pool size
//! - [`server`]: bind address
//!
//! # Example
//!
//! ```ignore
//! use scholarly_config::{CorsConfig, DatabaseConfig, EmailConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let cors_config = CorsConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! let database_config = DatabaseConfig::from_env()?;
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod error;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::ConfigError;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
