//! Integration tests for the liveness probe and metrics endpoint

use reqwest::StatusCode;
use token_test_utils::TestTokenServer;

/// `/health` returns 200 OK as long as the process can serve HTTP.
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestTokenServer::spawn().await?;

    // Act
    let response = reqwest::get(format!("{}/health", server.url())).await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Health check should return 200 OK"
    );
    assert_eq!(response.text().await?, "OK", "Health check body should be 'OK'");

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_prometheus_text() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    // Issue one token so the recorder has something to render
    server.fetch_token(Some("metrics")).await?;
    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await?.is_ascii());

    Ok(())
}
