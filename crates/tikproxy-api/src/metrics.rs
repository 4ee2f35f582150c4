//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "tikproxy_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tikproxy_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tikproxy_http_requests_in_flight";

    // Queue metrics
    pub const QUEUE_DEPTH: &str = "tikproxy_queue_depth";
    pub const JOBS_ENQUEUED_TOTAL: &str = "tikproxy_jobs_enqueued_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "tikproxy_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "tikproxy_jobs_failed_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Update queue depth gauge.
pub fn set_queue_depth(depth: u64) {
    gauge!(names::QUEUE_DEPTH).set(depth as f64);
}

/// Record job enqueued.
pub fn record_job_enqueued() {
    counter!(names::JOBS_ENQUEUED_TOTAL).increment(1);
}

/// Record job completed.
pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

/// Record job failed.
pub fn record_job_failed(stage: &str) {
    let labels = [("stage", stage.to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse artifact names and IDs).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/tiktok-proxy/[A-Za-z0-9_.-]+")
        .unwrap()
        .replace_all(path, "/tiktok-proxy/:artifact");
    let path = regex_lite::Regex::new(r"/[0-9]+(/|$)")
        .unwrap()
        .replace_all(&path, "/:id$1");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/tiktok-proxy/7291847265103884587-encoded.mp4"),
            "/tiktok-proxy/:artifact"
        );
        assert_eq!(sanitize_path("/fetch-tiktok"), "/fetch-tiktok");
        assert_eq!(sanitize_path("/video/12345"), "/video/:id");
    }
}
