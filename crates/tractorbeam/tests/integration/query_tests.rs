//! Integration tests for the query pass-through
//!
//! A wiremock server stands in for the Tractorbeam API.

use serde_json::json;
use tractorbeam::secret::SecretString;
use tractorbeam::{ClientConfig, ClientError, QueryRequest, TractorbeamClient};
use tractorbeam_test_utils::{test_secret_key, TokenAssertions};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(api_url: &str, secret: String) -> TractorbeamClient {
    let config = ClientConfig::new("pk_live_123".to_string(), SecretString::from(secret))
        .with_api_url(api_url);
    TractorbeamClient::new(config).expect("client should build")
}

fn bearer(request: &wiremock::Request) -> String {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .expect("request should carry a bearer token")
        .to_string()
}

/// One identity query mints one token and sends one request.
#[tokio::test]
async fn test_query_by_identity_sends_minted_token() -> Result<(), anyhow::Error> {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/client/query/"))
        .and(body_json(json!({"query": "SELECT * FROM contacts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [{"id": 1}]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tb = client(&mock_server.uri(), test_secret_key(1));

    // Act
    let result = tb
        .query(QueryRequest::by_identity(
            "user-42",
            Some(7),
            "SELECT * FROM contacts",
        ))
        .await?;

    // Assert
    assert_eq!(result, json!({"rows": [{"id": 1}]}));

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1);

    let token = requests.first().map(bearer).expect("one request");
    token
        .assert_valid_jwt()
        .assert_algorithm("RS256")
        .assert_for_subject("user-42")
        .assert_project_id(Some(7));

    let claims = tb.decode_token(&token)?;
    assert_eq!(claims.iss, "pk_live_123");

    Ok(())
}

#[tokio::test]
async fn test_query_server_error_surfaces_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/client/query/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tb = client(&mock_server.uri(), "test_api_secret".to_string());

    let err = tb
        .query(QueryRequest::by_identity("test_identity", Some(1), "SELECT 1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::RemoteQuery {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_query_by_token_forwards_token_unchanged() -> Result<(), anyhow::Error> {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/client/query/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let tb = client(&mock_server.uri(), "test_api_secret".to_string());

    tb.query(QueryRequest::by_token(
        SecretString::from("opaque-widget-token"),
        "SELECT 1",
    ))
    .await?;

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(
        requests.first().map(bearer).as_deref(),
        Some("opaque-widget-token")
    );
    Ok(())
}
