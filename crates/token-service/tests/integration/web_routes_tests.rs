//! Integration tests for the web UI routes (`/` and `/web/*`)

use reqwest::{redirect, StatusCode};
use token_test_utils::{TestTokenServer, TEST_INDEX_HTML};

#[tokio::test]
async fn test_root_redirects_to_web_ui() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()?;

    // Act
    let response = client.get(format!("{}/", server.url())).send().await?;

    // Assert
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/web/")
    );

    Ok(())
}

#[tokio::test]
async fn test_following_redirect_serves_index() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::get(format!("{}/", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, TEST_INDEX_HTML);

    Ok(())
}

#[tokio::test]
async fn test_static_asset_is_served() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    server.add_web_file("js/index.js", "console.log('hello');")?;

    let response = reqwest::get(format!("{}/web/js/index.js", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.contains("javascript"),
        "Unexpected content type: {}",
        content_type
    );
    assert_eq!(response.text().await?, "console.log('hello');");

    Ok(())
}

#[tokio::test]
async fn test_missing_asset_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::get(format!("{}/web/missing.css", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_path_traversal_does_not_escape_web_root() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::get(format!("{}/web/..%2f..%2fetc%2fpasswd", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::get(format!("{}/nope", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
