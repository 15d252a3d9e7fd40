//! Test server harness for E2E testing
//!
//! Provides TestTokenServer for spawning real token service instances in tests.

use crate::crypto_fixtures::test_credentials;
use common::access_token::TokenResponse;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use token_service::config::Config;
use token_service::handlers::token_handler::AppState;
use token_service::observability::init_metrics_recorder;
use token_service::routes;
use token_service::services::token_issuer::TokenIssuer;

/// Body served as `index.html` from the temporary web root.
pub const TEST_INDEX_HTML: &str = "<!doctype html><title>video chat</title>";

/// Test harness for spawning the token service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_token_flow_e2e() -> Result<()> {
///     let server = TestTokenServer::spawn().await?;
///
///     let response = reqwest::get(format!("{}/token?identity=Bob", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTokenServer {
    addr: SocketAddr,
    config: Config,
    _web_root: TempDir,
    handle: JoinHandle<()>,
}

impl TestTokenServer {
    /// Spawn a new test server instance
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Sign with the fixed test credentials
    /// - Serve a temporary web root containing `index.html`
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let web_root = tempfile::tempdir()
            .map_err(|e| anyhow::anyhow!("Failed to create web root: {}", e))?;
        std::fs::write(web_root.path().join("index.html"), TEST_INDEX_HTML)
            .map_err(|e| anyhow::anyhow!("Failed to write index.html: {}", e))?;

        let credentials = test_credentials();
        let config = Config {
            bind_address: "127.0.0.1:0"
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?,
            web_root: web_root.path().to_path_buf(),
            credentials: credentials.clone(),
            drain_seconds: 0,
        };

        let state = Arc::new(AppState {
            issuer: TokenIssuer::new(credentials),
            config: config.clone(),
        });

        // The global recorder can only be installed once per test process.
        // Later servers get a standalone recorder so /metrics still renders.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind(config.bind_address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _web_root: web_root,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory served under `/web`
    pub fn web_root(&self) -> &Path {
        &self.config.web_root
    }

    /// Request a token, failing on any non-200 response
    pub async fn fetch_token(&self, identity: Option<&str>) -> Result<TokenResponse, anyhow::Error> {
        let mut request = reqwest::Client::new().get(format!("{}/token", self.url()));
        if let Some(identity) = identity {
            request = request.query(&[("identity", identity)]);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Write an extra file into the served web root
    pub fn add_web_file(&self, relative: &str, contents: &str) -> Result<PathBuf, anyhow::Error> {
        let path = self.config.web_root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for TestTokenServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
