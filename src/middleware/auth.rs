//! Request gate: resolves `Authorization: Bearer <token>` into an
//! [`AuthContext`] stored in the request extensions.

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use scholarly_auth::Role;
use scholarly_core::AppError;

use crate::metrics::track_token_rejected;
use crate::modules::auth::error::AuthError;
use crate::modules::auth::model::{Principal, PrincipalKind};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;

/// The authenticated principal for the current request.
///
/// Roles come from a fresh store lookup, not from the token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal_id: i64,
    pub email: String,
    pub kind: PrincipalKind,
    pub roles: Vec<Role>,
}

impl AuthContext {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }
}

impl From<&Principal> for AuthContext {
    fn from(principal: &Principal) -> Self {
        Self {
            principal_id: principal.id,
            email: principal.email.clone(),
            kind: principal.kind,
            roles: vec![principal.role],
        }
    }
}

/// Extracts the token from a `Bearer ` authorization header. Anything else,
/// including an empty token, counts as no token at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies a token and loads the principal it names.
pub async fn resolve_context(state: &AppState, token: &str) -> Result<AuthContext, AuthError> {
    let claims = state.tokens.verify(token)?;

    let principal = AuthService::find_principal(&state.db, claims.subject())
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;

    Ok(AuthContext::from(&principal))
}

/// Runs once per request ahead of every `/api` handler.
///
/// Requests without a bearer token pass through unauthenticated. A token
/// that fails verification ends the request with 401, and a store failure
/// with 500.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return next.run(req).await;
    };

    match resolve_context(&state, &token).await {
        Ok(context) => {
            debug!(principal_id = context.principal_id, kind = ?context.kind, "Request authenticated");
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(err) => {
            match &err {
                AuthError::Token(token_err) => {
                    warn!(kind = token_err.kind(), "Rejected bearer token");
                    track_token_rejected(token_err.kind());
                }
                AuthError::PrincipalNotFound => {
                    warn!("Rejected bearer token for unknown principal");
                    track_token_rejected("principal_not_found");
                }
                _ => {}
            }
            err.into_response()
        }
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::forbidden(anyhow!("Access denied: authentication required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_are_no_token() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer    ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn context_role_intersection() {
        let context = AuthContext {
            principal_id: 1,
            email: "a@b.com".to_string(),
            kind: PrincipalKind::Student,
            roles: vec![Role::User],
        };
        assert!(context.has_any_role(&[Role::User, Role::Admin]));
        assert!(!context.has_any_role(&[Role::Admin]));
        assert!(!context.has_any_role(&[]));
    }
}
