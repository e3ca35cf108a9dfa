//! Prometheus metrics: per-route HTTP timings plus counters for sign-ins,
//! token rejections and catalog activity.
//!
//! Everything here is a no-op when `OBSERVABILITY_ENABLED` is `false` or `0`.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const REQUEST_DURATION: &str = "scholarly_http_request_duration_seconds";
const LATENCY_BUCKETS: &[f64] = &[0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

static ENABLED: OnceLock<bool> = OnceLock::new();

pub fn is_observability_enabled() -> bool {
    *ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|value| !matches!(value.to_lowercase().as_str(), "false" | "0"))
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            ticker.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Records count, latency and in-flight gauge per matched route template,
/// so `/api/courses/{id}` is one series no matter the id.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let started = Instant::now();
    let method = req.method().to_string();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    };

    gauge!("scholarly_http_requests_in_flight").increment(1.0);
    let response = next.run(req).await;
    gauge!("scholarly_http_requests_in_flight").decrement(1.0);

    let status = response.status().as_u16().to_string();
    histogram!(REQUEST_DURATION, "method" => method.clone(), "route" => route.clone())
        .record(started.elapsed().as_secs_f64());
    counter!("scholarly_http_requests_total", "method" => method, "route" => route, "status" => status)
        .increment(1);

    response
}

fn increment(name: &'static str, label: &'static str, value: &'static str) {
    if is_observability_enabled() {
        counter!(name, label => value).increment(1);
    }
}

/// Login attempts by outcome: `success` or `invalid_credentials`.
pub fn track_login(outcome: &'static str) {
    increment("scholarly_logins_total", "outcome", outcome);
}

pub fn track_token_issued() {
    if is_observability_enabled() {
        counter!("scholarly_tokens_issued_total").increment(1);
    }
}

/// Bearer tokens refused by the request gate, labelled by failure kind.
pub fn track_token_rejected(kind: &'static str) {
    increment("scholarly_tokens_rejected_total", "kind", kind);
}

/// Self-registrations by principal kind.
pub fn track_registration(kind: &'static str) {
    increment("scholarly_registrations_total", "kind", kind);
}

pub fn track_authorization_denied(required: &str) {
    if is_observability_enabled() {
        counter!("scholarly_authorization_denied_total", "required" => required.to_string())
            .increment(1);
    }
}

/// `enrolled` or `cancelled`.
pub fn track_enrollment(event: &'static str) {
    increment("scholarly_enrollments_total", "event", event);
}

/// `created`, `updated` or `deleted`; each one triggers a rating refresh.
pub fn track_review(event: &'static str) {
    increment("scholarly_reviews_total", "event", event);
}

/// `comment` for a top-level post, `reply` otherwise.
pub fn track_comment(kind: &'static str) {
    increment("scholarly_comments_total", "kind", kind);
}
