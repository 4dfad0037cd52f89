//! The Tractorbeam client facade.
//!
//! One `TractorbeamClient` binds one credential pair for its lifetime. It
//! resolves its key material once at construction and holds no mutable
//! state afterwards, so it can be cloned and shared across tasks freely.
//!
//! # Example
//!
//! ```rust,ignore
//! use tractorbeam::client::{QueryRequest, TractorbeamClient};
//!
//! let client = TractorbeamClient::new(ClientConfig::from_env()?)?;
//!
//! let results = client
//!     .query(QueryRequest::by_identity("user-42", Some(7), "SELECT * FROM contacts"))
//!     .await?;
//! ```
//!
//! # Security
//!
//! - The secret key never leaves the process and is never logged
//! - Minted tokens are sent only in the `Authorization` header
//! - Remote failures are returned as-is; nothing is retried

use crate::config::{ClientConfig, WidgetConfig};
use crate::error::ClientError;
use crate::issuer::TokenIssuer;
use crate::jwt::{Claims, SigningMode};
use crate::keys::KeyMaterial;
use crate::secret::{ExposeSecret, SecretString};
use crate::verifier::TokenVerifier;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Path of the query endpoint, relative to the API root.
const QUERY_PATH: &str = "/client/query/";

/// Options for [`TractorbeamClient::create_token`].
#[derive(Clone, PartialEq, Eq)]
pub struct CreateTokenOptions {
    /// End user identity; becomes `sub`.
    pub identity: String,

    /// Project scope; becomes `projectId` when present.
    pub project_id: Option<i64>,
}

impl fmt::Debug for CreateTokenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateTokenOptions")
            .field("identity", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl CreateTokenOptions {
    /// Options for an unscoped token.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            project_id: None,
        }
    }

    /// Scope the token to a project.
    #[must_use]
    pub fn with_project_id(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

/// How a query authenticates.
#[derive(Clone)]
pub enum QueryRequest {
    /// Use a bearer token the caller already holds.
    ByToken {
        /// Bearer token.
        token: SecretString,
        /// Query text.
        query: String,
    },
    /// Mint a fresh token for this identity first.
    ByIdentity {
        /// End user identity.
        identity: String,
        /// Project scope.
        project_id: Option<i64>,
        /// Query text.
        query: String,
    },
}

impl fmt::Debug for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByToken { query, .. } => f
                .debug_struct("ByToken")
                .field("token", &"[REDACTED]")
                .field("query", query)
                .finish(),
            Self::ByIdentity {
                project_id, query, ..
            } => f
                .debug_struct("ByIdentity")
                .field("identity", &"[REDACTED]")
                .field("project_id", project_id)
                .field("query", query)
                .finish(),
        }
    }
}

impl QueryRequest {
    /// Query with an existing bearer token.
    #[must_use]
    pub fn by_token(token: SecretString, query: impl Into<String>) -> Self {
        Self::ByToken {
            token,
            query: query.into(),
        }
    }

    /// Query on behalf of an identity, minting a token for it.
    #[must_use]
    pub fn by_identity(
        identity: impl Into<String>,
        project_id: Option<i64>,
        query: impl Into<String>,
    ) -> Self {
        Self::ByIdentity {
            identity: identity.into(),
            project_id,
            query: query.into(),
        }
    }
}

/// JSON body of the query endpoint.
#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

/// Client facade: issue and verify identity tokens, query the API.
#[derive(Clone)]
pub struct TractorbeamClient {
    api_key: String,
    api_url: String,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    http: reqwest::Client,
}

impl fmt::Debug for TractorbeamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TractorbeamClient")
            .field("api_key", &self.api_key)
            .field("api_url", &self.api_url)
            .field("signing_mode", &self.signing_mode())
            .finish_non_exhaustive()
    }
}

impl TractorbeamClient {
    /// Create a client for one credential pair.
    ///
    /// # Errors
    ///
    /// - `ClientError::KeyFormat` if the secret cannot be resolved for the
    ///   selected signing mode
    /// - `ClientError::Configuration` if the HTTP client cannot be built
    #[instrument(skip_all)]
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mode = config.resolved_signing_mode();
        let keys = Arc::new(KeyMaterial::resolve(&config.api_secret, mode)?);

        // No request timeout: callers bound remote calls themselves.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            target: "tractorbeam.client",
            api_key = %config.api_key,
            api_url = %config.api_url,
            mode = %mode,
            "Client initialized"
        );

        Ok(Self {
            issuer: TokenIssuer::new(config.api_key.clone(), Arc::clone(&keys)),
            verifier: TokenVerifier::new(keys),
            api_key: config.api_key,
            api_url: config.api_url,
            http,
        })
    }

    /// The signing mode fixed for this client.
    #[must_use]
    pub fn signing_mode(&self) -> SigningMode {
        self.issuer.mode()
    }

    /// The publishable key this client issues tokens as.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The API root for remote calls.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Mint a token for an identity.
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidIdentity` if the identity is empty
    /// - `ClientError::KeyFormat` if signing fails
    pub fn create_token(&self, options: &CreateTokenOptions) -> Result<String, ClientError> {
        self.issuer.issue(&options.identity, options.project_id)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// `ClientError::InvalidSignature`, `ClientError::TokenExpired`, or
    /// `ClientError::TokenNotYetValid`; see [`TokenVerifier::verify`].
    pub fn decode_token(&self, token: &str) -> Result<Claims, ClientError> {
        self.verifier.verify(token)
    }

    /// Mint a token and wrap it in a [`WidgetConfig`] pointing at this
    /// client's API root.
    ///
    /// # Errors
    ///
    /// Same as [`TractorbeamClient::create_token`].
    pub fn create_widget_config(
        &self,
        options: &CreateTokenOptions,
    ) -> Result<WidgetConfig, ClientError> {
        let token = self.create_token(options)?;
        Ok(WidgetConfig::new(SecretString::from(token))?.with_api_url(&self.api_url))
    }

    /// Run a query against the API.
    ///
    /// `ByIdentity` requests mint exactly one token before the request;
    /// `ByToken` requests use the supplied token as-is. Either way exactly
    /// one `POST {api_url}/client/query/` is sent, with no retry.
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidIdentity` / `ClientError::KeyFormat` if a token
    ///   has to be minted and that fails (no request is sent)
    /// - `ClientError::InvalidRequest` if the request cannot be built, e.g. a
    ///   supplied token that is not a valid header value (nothing is sent)
    /// - `ClientError::Http` if no response was received
    /// - `ClientError::RemoteQuery` for a non-2xx response
    /// - `ClientError::InvalidResponse` if a 2xx body is not JSON
    #[instrument(skip_all)]
    pub async fn query(&self, request: QueryRequest) -> Result<serde_json::Value, ClientError> {
        let (token, query) = match request {
            QueryRequest::ByToken { token, query } => (token, query),
            QueryRequest::ByIdentity {
                identity,
                project_id,
                query,
            } => {
                let token = self.issuer.issue(&identity, project_id)?;
                (SecretString::from(token), query)
            }
        };

        let url = format!("{}{QUERY_PATH}", self.api_url);
        debug!(target: "tractorbeam.client", url = %url, "Sending query");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&QueryBody { query: &query })
            .send()
            .await
            .map_err(|e| ClientError::transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(target: "tractorbeam.client", status = %status, "Query rejected");
            return Err(ClientError::remote(status));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
