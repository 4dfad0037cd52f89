//! Integration tests for the connections client
//!
//! A backend mints a widget configuration; the connections client then
//! walks a provider through the OAuth2 connect flow against a mock API.

use serde_json::json;
use tractorbeam::connections::{ConnectionStatus, ConnectionsClient};
use tractorbeam::secret::SecretString;
use tractorbeam::{ClientConfig, CreateTokenOptions, TractorbeamClient};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connection(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "identity": "user-42",
        "providerConfigId": 3,
        "type": "oauth2",
        "status": status,
        "provider": {"name": "salesforce"},
        "createdAt": "2024-05-01T12:00:00Z",
        "updatedAt": "2024-05-01T12:00:00Z"
    })
}

#[tokio::test]
async fn test_connect_flow_with_minted_widget_config() -> Result<(), anyhow::Error> {
    // Arrange
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/client/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"providerConfigId": 3, "type": "oauth2", "provider": {"name": "salesforce"}}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/client/connections"))
        .and(body_json(json!({"identity": "user-42", "providerConfigId": 3})))
        .respond_with(ResponseTemplate::new(201).set_body_json(connection(9, "pending")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/client/connections/9/oauth2/authorize"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://login.salesforce.com/authorize"})),
        )
        .mount(&mock_server)
        .await;

    let backend = TractorbeamClient::new(
        ClientConfig::new("pk".to_string(), SecretString::from("test_api_secret"))
            .with_api_url(&mock_server.uri()),
    )?;
    let widget =
        backend.create_widget_config(&CreateTokenOptions::new("user-42").with_project_id(1))?;
    let connections = ConnectionsClient::new(widget)?;

    // Act
    let providers = connections.list_providers().await?;
    let provider = providers.first().expect("one provider");
    let created = connections
        .create_connection(provider.provider_config_id)
        .await?;
    let url = connections.oauth2_authorize_url(created.id).await?;

    // Assert
    assert_eq!(created.status, ConnectionStatus::Pending);
    assert!(!created.is_connected());
    assert_eq!(url, "https://login.salesforce.com/authorize");

    Ok(())
}
