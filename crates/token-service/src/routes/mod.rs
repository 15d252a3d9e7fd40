//! HTTP routes for the token service.

use crate::handlers::health_handler::health_check;
use crate::handlers::metrics_handler::metrics_handler;
use crate::handlers::token_handler::{handle_get_token, AppState};
use crate::middleware::http_metrics_middleware;
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Path prefix the static web UI is served under.
pub const WEB_PATH_PREFIX: &str = "/web";

/// Request timeout applied to every route.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the application routes.
///
/// - `/` - Redirect to the web UI
/// - `/token` - Issue an access token
/// - `/health` - Liveness probe
/// - `/metrics` - Prometheus metrics
/// - `/web/*` - Static web UI bundle from `config.web_root`
///
/// Layers: CORS (any origin may GET), tracing, 30s timeout, and HTTP metrics
/// as the outermost layer.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let web_root = state.config.web_root.clone();

    let app_routes = Router::new()
        .route("/", get(redirect_to_web))
        .route("/token", get(handle_get_token))
        .route("/health", get(health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    app_routes
        .merge(metrics_routes)
        .nest_service(WEB_PATH_PREFIX, ServeDir::new(web_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// GET / -> 302 to the web UI index.
async fn redirect_to_web() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("{WEB_PATH_PREFIX}/"))],
    )
}
