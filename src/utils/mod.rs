//! Shared utilities.
//!
//! - [`email`]: SMTP notifications for enrollment and review activity

pub mod email;
