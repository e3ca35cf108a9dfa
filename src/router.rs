use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::{REQUEST_ID_HEADER, logging_middleware};
use crate::metrics::metrics_middleware;
use crate::middleware::auth::authenticate;
use crate::middleware::role::{require_admin, require_member};
use crate::modules::auth::router::init_auth_router;
use crate::modules::categories::router::init_categories_router;
use crate::modules::comments::router::init_comments_router;
use crate::modules::courses::router::init_courses_router;
use crate::modules::enrollments::router::init_enrollments_router;
use crate::modules::instructors::router::init_instructors_router;
use crate::modules::reviews::router::init_reviews_router;
use crate::modules::students::router::init_students_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes under `/api`. Every request passes the bearer-token gate first;
/// role policies run afterwards, per prefix or per handler.
fn init_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", init_auth_router())
        .nest(
            "/students",
            init_students_router().route_layer(middleware::from_fn(require_member)),
        )
        .nest(
            "/instructors",
            init_instructors_router().route_layer(middleware::from_fn(require_admin)),
        )
        .nest("/categories", init_categories_router())
        .nest("/courses", init_courses_router())
        .nest(
            "/enrollments",
            init_enrollments_router().route_layer(middleware::from_fn(require_member)),
        )
        .nest(
            "/reviews",
            init_reviews_router().route_layer(middleware::from_fn(require_member)),
        )
        .nest("/comments", init_comments_router())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}

/// Builds the application. `/metrics` is only mounted when a Prometheus
/// recorder was installed.
pub fn init_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api", init_api_router(&state))
        .with_state(state.clone());

    if let Some(handle) = metrics_handle {
        router = router.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(logging_middleware))
            .layer(middleware::from_fn(metrics_middleware))
            .layer(cors_layer(&state)),
    )
}
