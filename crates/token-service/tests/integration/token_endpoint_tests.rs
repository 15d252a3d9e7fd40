//! Integration tests for `GET /token`
//!
//! Drive a real server over HTTP and check the issued tokens end to end.

use common::access_token::{peek_claims, MAX_SESSION_DURATION_SECONDS};
use reqwest::StatusCode;
use serde_json::Value;
use token_service::crypto::verify_access_token;
use token_service::services::name_generator::is_generated_name;
use token_test_utils::{
    test_credentials, test_credentials_with_secret, TestTokenServer, TokenAssertions,
};

async fn get_token(server: &TestTokenServer, query: &str) -> Result<(StatusCode, Value), anyhow::Error> {
    let response = reqwest::Client::new()
        .get(format!("{}/token{}", server.url(), query))
        .send()
        .await?;
    let status = response.status();
    let body: Value = response.json().await?;
    Ok((status, body))
}

fn token_of(body: &Value) -> String {
    body["token"]
        .as_str()
        .expect("response should carry a token string")
        .to_string()
}

#[tokio::test]
async fn test_supplied_identity_is_bound_verbatim() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestTokenServer::spawn().await?;

    // Act
    let (status, body) = get_token(&server, "?identity=Bob").await?;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"], "Bob");

    token_of(&body)
        .assert_valid_access_token()
        .assert_for_identity("Bob")
        .assert_video_grant_only()
        .assert_session_lifetime()
        .assert_expires_in(MAX_SESSION_DURATION_SECONDS as u64)
        .assert_verifies_with(&test_credentials());

    Ok(())
}

#[tokio::test]
async fn test_missing_identity_gets_generated_name() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (status, body) = get_token(&server, "").await?;

    assert_eq!(status, StatusCode::OK);
    let identity = body["identity"].as_str().expect("identity should be a string");
    assert!(
        is_generated_name(identity),
        "'{}' should be built from the three word lists",
        identity
    );
    token_of(&body).assert_for_identity(identity);

    Ok(())
}

#[tokio::test]
async fn test_empty_identity_gets_generated_name() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (status, body) = get_token(&server, "?identity=").await?;

    assert_eq!(status, StatusCode::OK);
    let identity = body["identity"].as_str().expect("identity should be a string");
    assert!(is_generated_name(identity));

    Ok(())
}

#[tokio::test]
async fn test_percent_encoded_identity_is_decoded() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (status, body) = get_token(&server, "?identity=Ana%20Mar%C3%ADa").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"], "Ana María");
    token_of(&body).assert_for_identity("Ana María");

    Ok(())
}

#[tokio::test]
async fn test_unknown_query_parameters_are_ignored() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (status, body) = get_token(&server, "?identity=alice&room=lobby").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"], "alice");
    token_of(&body).assert_video_grant_only();

    Ok(())
}

#[tokio::test]
async fn test_duplicate_identity_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (status, body) = get_token(&server, "?identity=a&identity=b").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body.get("token").is_none(), "No token on a failed request");

    Ok(())
}

#[tokio::test]
async fn test_generated_tokens_share_issuer_and_lifetime() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (_, first) = get_token(&server, "").await?;
    let (_, second) = get_token(&server, "").await?;

    let first_claims = peek_claims(&token_of(&first))?;
    let second_claims = peek_claims(&token_of(&second))?;
    assert_eq!(first_claims.iss, second_claims.iss);
    assert_eq!(first_claims.ttl_seconds(), MAX_SESSION_DURATION_SECONDS);

    Ok(())
}

#[tokio::test]
async fn test_token_does_not_verify_under_another_secret() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let (_, body) = get_token(&server, "?identity=carol").await?;

    let other = test_credentials_with_secret("not-the-server-secret");
    assert!(verify_access_token(&token_of(&body), &other).is_err());

    Ok(())
}

#[tokio::test]
async fn test_response_allows_cross_origin_reads() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/token?identity=dave", server.url()))
        .header("Origin", "http://localhost:8080")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    Ok(())
}
