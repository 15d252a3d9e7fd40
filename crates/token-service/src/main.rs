use std::sync::Arc;
use std::time::Duration;
use token_service::config::Config;
use token_service::handlers::token_handler::AppState;
use token_service::observability;
use token_service::routes;
use token_service::services::token_issuer::TokenIssuer;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_service=debug,token_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Video Token Service");

    // Credentials are validated here so a misconfigured process never serves
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        web_root = %config.web_root.display(),
        api_key_sid = %config.credentials.api_key_sid(),
        "Configuration loaded successfully"
    );

    if !config.web_root.is_dir() {
        warn!(
            web_root = %config.web_root.display(),
            "Web root is not a directory; /web will return 404"
        );
    }

    let metrics_handle = observability::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let bind_address = config.bind_address;
    let drain_seconds = config.drain_seconds;

    let state = Arc::new(AppState {
        issuer: TokenIssuer::new(config.credentials.clone()),
        config,
    });

    let app = routes::build_routes(state, metrics_handle);

    info!("Video Token Service listening on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_seconds))
        .await?;

    info!("Video Token Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT), then waits out the drain period.
async fn shutdown_signal(drain_seconds: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_seconds > 0 {
        warn!("Draining connections for {} seconds...", drain_seconds);
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
        info!("Drain period complete");
    }
}
