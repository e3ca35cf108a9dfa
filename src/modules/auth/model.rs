use std::fmt;

use serde::Serialize;
use sqlx::FromRow;

use scholarly_auth::Role;

use super::error::AuthError;

/// Which store a principal lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Student,
    Instructor,
}

impl PrincipalKind {
    /// Lookup order for email resolution.
    pub const LOOKUP_ORDER: [PrincipalKind; 2] = [PrincipalKind::Student, PrincipalKind::Instructor];

    /// Role granted at creation. Not configurable.
    pub fn role(&self) -> Role {
        match self {
            PrincipalKind::Student => Role::User,
            PrincipalKind::Instructor => Role::Admin,
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            PrincipalKind::Student => "students",
            PrincipalKind::Instructor => "instructors",
        }
    }
}

#[derive(FromRow)]
pub(crate) struct PrincipalRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// An authenticatable identity with its credential digest.
#[derive(Clone)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub kind: PrincipalKind,
    pub role: Role,
    pub(crate) password_hash: String,
}

impl Principal {
    pub(crate) fn from_row(kind: PrincipalKind, row: PrincipalRow) -> Result<Self, AuthError> {
        let role = row
            .role
            .parse()
            .map_err(|e| AuthError::Internal(format!("{} {} has {}", kind.table(), row.id, e)))?;

        Ok(Self {
            id: row.id,
            email: row.email,
            kind,
            role,
            password_hash: row.password,
        })
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("kind", &self.kind)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
