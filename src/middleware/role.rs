//! Route-level authorization.
//!
//! Every rule is disjunctive: a request passes when the gate attached an
//! [`AuthContext`] whose roles intersect the route's set. Anything else is
//! 403, including requests that arrived without a token.
//!
//! Two ways to apply a policy:
//! 1. `route_layer(middleware::from_fn(require_admin))` for a whole router
//! 2. the [`RequireMember`] / [`RequireAdmin`] extractors per handler

use anyhow::anyhow;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

use scholarly_auth::Role;
use scholarly_core::AppError;

use crate::metrics::track_authorization_denied;
use crate::middleware::auth::AuthContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    any_of: &'static [Role],
}

impl AccessPolicy {
    /// Any signed-in student or instructor.
    pub const MEMBER: Self = Self::any_of(&[Role::User, Role::Admin]);
    pub const ADMIN: Self = Self::any_of(&[Role::Admin]);

    pub const fn any_of(roles: &'static [Role]) -> Self {
        Self { any_of: roles }
    }

    pub fn roles(&self) -> &'static [Role] {
        self.any_of
    }

    pub fn allows(&self, context: Option<&AuthContext>) -> bool {
        context.is_some_and(|context| context.has_any_role(self.any_of))
    }

    pub fn check(&self, context: Option<&AuthContext>) -> Result<(), AppError> {
        if self.allows(context) {
            return Ok(());
        }

        let required = self
            .any_of
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        debug!(authenticated = context.is_some(), %required, "Authorization denied");
        track_authorization_denied(&required);

        Err(AppError::forbidden(anyhow!(
            "Access denied. Required role: {}",
            required
        )))
    }
}

/// Generates an extractor that enforces an [`AccessPolicy`] and yields the
/// caller's [`AuthContext`].
macro_rules! require_roles {
    ($name:ident, $policy:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthContext);

        impl<S> axum::extract::FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = scholarly_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                _state: &S,
            ) -> Result<Self, Self::Rejection> {
                let context = parts
                    .extensions
                    .get::<$crate::middleware::auth::AuthContext>();

                $policy.check(context)?;

                context
                    .cloned()
                    .map($name)
                    .ok_or_else(|| scholarly_core::AppError::forbidden(anyhow::anyhow!("Access denied")))
            }
        }
    };
}

require_roles!(RequireMember, AccessPolicy::MEMBER);
require_roles!(RequireAdmin, AccessPolicy::ADMIN);

async fn enforce(policy: AccessPolicy, req: Request, next: Next) -> Result<Response, AppError> {
    policy.check(req.extensions().get::<AuthContext>())?;
    Ok(next.run(req).await)
}

/// Middleware for routers open to any member.
pub async fn require_member(req: Request, next: Next) -> Result<Response, AppError> {
    enforce(AccessPolicy::MEMBER, req, next).await
}

/// Middleware for admin-only routers.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    enforce(AccessPolicy::ADMIN, req, next).await
}
