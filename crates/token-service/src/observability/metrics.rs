//! Metrics definitions for the token service
//!
//! All metrics follow Prometheus naming conventions:
//! - `vts_` prefix (video token service)
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `identity_source`: 2 values (supplied, generated)
//! - `status`: 2-3 values (success, error, timeout)
//! - `endpoint`: known routes, everything else is `/other`
//! - `error_category`: 2 values (request, cryptographic)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle used by `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder cannot be installed (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("vts_http_request".to_string()),
            &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("vts_token_issuance".to_string()),
            &[0.0001, 0.0005, 0.001, 0.002, 0.005, 0.010, 0.050],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `vts_token_issuance_duration_seconds`, `vts_token_issuance_total`
/// Labels: `identity_source`, `status`
pub fn record_token_issuance(identity_source: &str, status: &str, duration: Duration) {
    histogram!("vts_token_issuance_duration_seconds", "identity_source" => identity_source.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("vts_token_issuance_total", "identity_source" => identity_source.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record token verification result
///
/// Metric: `vts_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("vts_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `vts_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("vts_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record an HTTP request
///
/// Metric: `vts_http_request_duration_seconds`, `vts_http_requests_total`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("vts_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("vts_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=399 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Collapse request paths to a bounded label set.
///
/// Static UI files share one label regardless of file name.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/token" => "/token",
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/web" => "/web/*",
        _ if path.starts_with("/web/") => "/web/*",
        _ => "/other",
    }
}
