//! Access logging middleware.
//!
//! Emits one structured log line per request with a correlation id, the
//! normalized path, status, and latency. Log-based metrics aggregate these
//! lines; no separate metrics endpoint is exposed.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, info_span, Instrument};

/// Access-log middleware.
///
/// The correlation id is taken from `X-Cloud-Trace-Context` when present,
/// otherwise generated, and recorded on the request span so handler logs
/// carry it too.
pub async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = request
        .headers()
        .get("X-Cloud-Trace-Context")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split('/').next().unwrap_or(s).to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let span = info_span!(
        "request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as u64);

    info!(
        target: "company_registry::access",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    response
}

/// Normalize a path for logging to avoid high cardinality.
///
/// Replaces UUID path segments with an `:id` placeholder.
fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap();

    uuid_regex.replace_all(path, ":id").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_uuid() {
        let path = "/api/v1/company/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/company/:id");
    }

    #[test]
    fn test_normalize_path_preserves_regular_path() {
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
