use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Router, middleware, routing::get};
use tower::ServiceExt;

use scholarly::middleware::auth::AuthContext;
use scholarly::middleware::role::{AccessPolicy, RequireAdmin, RequireMember, require_admin};
use scholarly::modules::auth::model::PrincipalKind;
use scholarly_auth::Role;

fn context(kind: PrincipalKind) -> AuthContext {
    AuthContext {
        principal_id: 11,
        email: "someone@test.com".to_string(),
        kind,
        roles: vec![kind.role()],
    }
}

async fn admin_only(RequireAdmin(caller): RequireAdmin) -> String {
    caller.email
}

async fn members(RequireMember(caller): RequireMember) -> String {
    caller.principal_id.to_string()
}

fn app() -> Router {
    Router::new()
        .route("/admin", get(admin_only))
        .route("/member", get(members))
        .route(
            "/layered",
            get(|| async { "ok" }).route_layer(middleware::from_fn(require_admin)),
        )
}

async fn status_for(uri: &str, caller: Option<AuthContext>) -> StatusCode {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    if let Some(caller) = caller {
        request.extensions_mut().insert(caller);
    }
    app().oneshot(request).await.unwrap().status()
}

#[test]
fn test_roles_follow_principal_kind() {
    assert_eq!(PrincipalKind::Student.role(), Role::User);
    assert_eq!(PrincipalKind::Instructor.role(), Role::Admin);
}

#[test]
fn test_policies_are_disjunctive() {
    let student = context(PrincipalKind::Student);
    let instructor = context(PrincipalKind::Instructor);

    assert!(AccessPolicy::MEMBER.allows(Some(&student)));
    assert!(AccessPolicy::MEMBER.allows(Some(&instructor)));
    assert!(AccessPolicy::ADMIN.allows(Some(&instructor)));
    assert!(!AccessPolicy::ADMIN.allows(Some(&student)));
    assert_eq!(AccessPolicy::ADMIN.roles(), &[Role::Admin]);
}

#[test]
fn test_missing_context_is_forbidden() {
    for policy in [AccessPolicy::MEMBER, AccessPolicy::ADMIN] {
        let err = policy.check(None).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_extractors_enforce_policy() {
    let student = context(PrincipalKind::Student);
    let instructor = context(PrincipalKind::Instructor);

    assert_eq!(status_for("/admin", Some(instructor.clone())).await, StatusCode::OK);
    assert_eq!(status_for("/admin", Some(student.clone())).await, StatusCode::FORBIDDEN);
    assert_eq!(status_for("/admin", None).await, StatusCode::FORBIDDEN);

    assert_eq!(status_for("/member", Some(student)).await, StatusCode::OK);
    assert_eq!(status_for("/member", None).await, StatusCode::FORBIDDEN);

    assert_eq!(status_for("/layered", Some(instructor)).await, StatusCode::OK);
    assert_eq!(status_for("/layered", None).await, StatusCode::FORBIDDEN);
}
