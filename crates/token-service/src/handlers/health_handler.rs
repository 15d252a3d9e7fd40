//! Liveness probe.
//!
//! The service has no dependencies to check at runtime (credentials are
//! validated before the listener starts), so there is no readiness probe.

/// Liveness probe handler.
///
/// Returns "OK" while the process can serve HTTP.
pub async fn health_check() -> &'static str {
    "OK"
}
