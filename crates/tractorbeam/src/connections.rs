//! Connections API client.
//!
//! Typed access to the provider and connection endpoints an end user's
//! connection manager works with: list the configured providers, create a
//! connection to one, fetch the OAuth2 authorization URL to complete it,
//! and list or remove existing connections.
//!
//! Every call is a single round trip authenticated with the widget's bearer
//! token. Non-2xx responses surface as `ClientError::RemoteQuery`; nothing
//! is cached or retried.

use crate::config::WidgetConfig;
use crate::error::ClientError;
use crate::secret::{ExposeSecret, SecretString};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Path prefix of the client API, relative to the API root.
const CLIENT_API_PREFIX: &str = "/api/client";

/// How a provider authenticates its connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// OAuth2 authorization-code flow.
    Oauth2,
    /// Username and password.
    Credentials,
    /// A single API secret.
    Secret,
    /// Provider-specific JSON document.
    Custom,
}

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Created but not yet authorized.
    Pending,
    /// Authorized and usable.
    Active,
    /// Authorization failed.
    Failed,
}

/// Display information about a data source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderInfo {
    /// Provider name, e.g. `"hubspot"`.
    pub name: String,

    /// Logo path relative to the API root.
    #[serde(default)]
    pub logo: Option<String>,
}

/// A provider configured for the token's project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Identifier to pass to [`ConnectionsClient::create_connection`].
    pub provider_config_id: i64,

    /// Authentication style of the provider.
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,

    /// Display information.
    pub provider: ProviderInfo,
}

/// An end user's link to a data source.
///
/// Credential fields are `SecretString` and redacted in Debug output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: i64,
    pub identity: String,
    pub provider_config_id: i64,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub status: ConnectionStatus,
    pub provider: ProviderInfo,

    #[serde(rename = "oauth2_accessToken", default)]
    pub oauth2_access_token: Option<SecretString>,
    #[serde(rename = "oauth2_refreshToken", default)]
    pub oauth2_refresh_token: Option<SecretString>,
    #[serde(rename = "oauth2_expiresAt", default)]
    pub oauth2_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "oauth2_scope", default)]
    pub oauth2_scope: Option<String>,

    #[serde(rename = "credentials_username", default)]
    pub credentials_username: Option<String>,
    #[serde(rename = "credentials_password", default)]
    pub credentials_password: Option<SecretString>,

    #[serde(rename = "secret_secret", default)]
    pub secret: Option<SecretString>,

    #[serde(rename = "custom_jsonContents", default)]
    pub custom_json_contents: Option<SecretString>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Whether the connection holds an OAuth2 access token.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.oauth2_access_token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateConnectionBody<'a> {
    identity: &'a str,
    provider_config_id: i64,
}

#[derive(Deserialize)]
struct AuthorizeResponse {
    url: String,
}

/// Client for the provider and connection endpoints.
#[derive(Debug, Clone)]
pub struct ConnectionsClient {
    config: WidgetConfig,
    http: reqwest::Client,
}

impl ConnectionsClient {
    /// Create a client using the widget's token and API root.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: WidgetConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// The configuration this client authenticates with.
    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Providers configured for the token's project.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    #[instrument(skip_all)]
    pub async fn list_providers(&self) -> Result<Vec<Provider>, ClientError> {
        self.get("/providers").await
    }

    /// All connections of the token's identity, including pending ones.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    #[instrument(skip_all)]
    pub async fn list_connections(&self) -> Result<Vec<Connection>, ClientError> {
        self.get("/connections").await
    }

    /// Connections that finished (or failed) authorization.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    pub async fn visible_connections(&self) -> Result<Vec<Connection>, ClientError> {
        let connections = self.list_connections().await?;
        Ok(connections
            .into_iter()
            .filter(|c| c.status != ConnectionStatus::Pending)
            .collect())
    }

    /// A single connection.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    #[instrument(skip(self))]
    pub async fn get_connection(&self, connection_id: i64) -> Result<Connection, ClientError> {
        self.get(&format!("/connections/{connection_id}")).await
    }

    /// Start a connection to a provider for the token's identity.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    #[instrument(skip(self))]
    pub async fn create_connection(
        &self,
        provider_config_id: i64,
    ) -> Result<Connection, ClientError> {
        let body = CreateConnectionBody {
            identity: self.config.identity(),
            provider_config_id,
        };
        let request = self.http.post(self.url("/connections")).json(&body);
        let response = self.send(request).await?;
        parse_json(response).await
    }

    /// Remove a connection.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    #[instrument(skip(self))]
    pub async fn delete_connection(&self, connection_id: i64) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("/connections/{connection_id}")));
        self.send(request).await?;
        Ok(())
    }

    /// URL that sends the user to the provider's OAuth2 consent screen.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsClient`] for the error model.
    #[instrument(skip(self))]
    pub async fn oauth2_authorize_url(&self, connection_id: i64) -> Result<String, ClientError> {
        let response: AuthorizeResponse = self
            .get(&format!("/connections/{connection_id}/oauth2/authorize"))
            .await?;
        Ok(response.url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{CLIENT_API_PREFIX}{path}", self.config.api_url())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        parse_json(response).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let token: &SecretString = self.config.token();
        let response = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| ClientError::transport(&e))?;

        let status = response.status();
        debug!(target: "tractorbeam.connections", status = %status, "Response received");

        if status.is_success() {
            Ok(response)
        } else {
            Err(ClientError::remote(status))
        }
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
