//! Client and widget configuration.
//!
//! `ClientConfig` binds one credential pair for a backend integrator.
//! `WidgetConfig` is the front-end side: a bearer token minted by that
//! backend plus the API root, validated when it is built rather than when a
//! request is made.

use crate::error::ClientError;
use crate::jwt::{peek_payload, SigningMode};
use crate::secret::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;

/// Default API root.
pub const DEFAULT_API_URL: &str = "https://api.tractorbeam.ai";

/// Environment variable holding the publishable key.
pub const API_KEY_VAR: &str = "TRACTORBEAM_API_KEY";

/// Environment variable holding the secret key.
pub const API_SECRET_VAR: &str = "TRACTORBEAM_API_SECRET";

/// Environment variable overriding the API root.
pub const API_URL_VAR: &str = "TRACTORBEAM_API_URL";

/// Environment variable pinning the signing mode (`RS256` or `HS256`).
pub const SIGNING_MODE_VAR: &str = "TRACTORBEAM_SIGNING_MODE";

/// Configuration for a [`TractorbeamClient`](crate::client::TractorbeamClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Publishable key; becomes the `iss` claim.
    pub api_key: String,

    /// Secret signing key. Never transmitted or logged.
    pub api_secret: SecretString,

    /// API root for remote calls, without a trailing slash.
    pub api_url: String,

    /// Pinned signing mode. `None` derives it from the secret's shape.
    pub signing_mode: Option<SigningMode>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("signing_mode", &self.signing_mode)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with the default API root and a signing mode
    /// derived from the secret.
    #[must_use]
    pub fn new(api_key: String, api_secret: SecretString) -> Self {
        Self {
            api_key,
            api_secret,
            api_url: DEFAULT_API_URL.to_string(),
            signing_mode: None,
        }
    }

    /// Set the API root.
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Pin the signing mode instead of deriving it from the secret.
    #[must_use]
    pub fn with_signing_mode(mut self, mode: SigningMode) -> Self {
        self.signing_mode = Some(mode);
        self
    }

    /// The signing mode this configuration selects.
    #[must_use]
    pub fn resolved_signing_mode(&self) -> SigningMode {
        self.signing_mode
            .unwrap_or_else(|| SigningMode::detect(self.api_secret.expose_secret()))
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_vars`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the key or secret is missing
    /// or empty, or the signing mode is not `RS256`/`HS256`.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ClientError> {
        let api_key = required(vars, API_KEY_VAR)?;
        let api_secret = SecretString::from(required(vars, API_SECRET_VAR)?);

        let mut config = Self::new(api_key, api_secret);

        if let Some(api_url) = vars.get(API_URL_VAR).filter(|v| !v.is_empty()) {
            config = config.with_api_url(api_url);
        }

        if let Some(mode) = vars.get(SIGNING_MODE_VAR).filter(|v| !v.is_empty()) {
            config = config.with_signing_mode(mode.parse()?);
        }

        Ok(config)
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ClientError> {
    vars.get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| {
            ClientError::Configuration(format!("Missing required environment variable: {name}"))
        })
}

/// The claims a widget reads; everything else is the API's concern.
#[derive(Deserialize)]
struct WidgetClaims {
    sub: String,
    #[serde(rename = "projectId", default)]
    project_id: Option<i64>,
}

/// Configuration handed to front-end consumers of the API.
///
/// Holds the bearer token the backend minted and the identity it names.
/// The identity is read without verification; the API verifies the token
/// on every request.
#[derive(Clone)]
pub struct WidgetConfig {
    token: SecretString,
    api_url: String,
    identity: String,
    project_id: Option<i64>,
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("identity", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl WidgetConfig {
    /// Build a widget configuration around a bearer token.
    ///
    /// Only `sub` and `projectId` are read from the payload; tokens lacking
    /// `iss` or the time claims are still accepted here.
    ///
    /// # Errors
    ///
    /// - `ClientError::Configuration` if the token is empty
    /// - `ClientError::InvalidSignature` if the payload is unreadable or has
    ///   no string `sub`
    pub fn new(token: SecretString) -> Result<Self, ClientError> {
        if token.expose_secret().is_empty() {
            return Err(ClientError::Configuration(
                "Tractorbeam API token must not be empty".into(),
            ));
        }

        let claims: WidgetClaims = peek_payload(token.expose_secret())?;

        Ok(Self {
            token,
            api_url: DEFAULT_API_URL.to_string(),
            identity: claims.sub,
            project_id: claims.project_id,
        })
    }

    /// Set the API root.
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Bearer token for API requests.
    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// API root, without a trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Identity (`sub`) the token was minted for.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Project scope of the token, if any.
    #[must_use]
    pub fn project_id(&self) -> Option<i64> {
        self.project_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use jsonwebtoken::Algorithm;
    use serde_json::json;
    use tractorbeam_test_utils::TestTokenBuilder;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("pk".into(), SecretString::from("secret"));

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.signing_mode, None);
        assert_eq!(config.resolved_signing_mode(), SigningMode::Hs256);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("pk".into(), SecretString::from("secret"))
            .with_api_url("http://localhost:8080/")
            .with_signing_mode(SigningMode::Rs256);

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.resolved_signing_mode(), SigningMode::Rs256);
    }

    #[test]
    fn test_config_detects_rs256_from_prefix() {
        let config = ClientConfig::new("pk".into(), SecretString::from("sk_abc"));
        assert_eq!(config.resolved_signing_mode(), SigningMode::Rs256);
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = ClientConfig::new("pk".into(), SecretString::from("super-secret-value"));

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret-value"));
    }

    #[test]
    fn test_from_vars_success() {
        let config = ClientConfig::from_vars(&vars(&[
            (API_KEY_VAR, "pk_test"),
            (API_SECRET_VAR, "test_api_secret"),
            (API_URL_VAR, "http://localhost:9000"),
            (SIGNING_MODE_VAR, "hs256"),
        ]))
        .expect("Config should load successfully");

        assert_eq!(config.api_key, "pk_test");
        assert_eq!(config.api_secret.expose_secret(), "test_api_secret");
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.signing_mode, Some(SigningMode::Hs256));
    }

    #[test]
    fn test_from_vars_defaults_optional_values() {
        let config = ClientConfig::from_vars(&vars(&[
            (API_KEY_VAR, "pk_test"),
            (API_SECRET_VAR, "test_api_secret"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.signing_mode, None);
    }

    #[test]
    fn test_from_vars_missing_api_key() {
        let result = ClientConfig::from_vars(&vars(&[(API_SECRET_VAR, "secret")]));
        assert!(
            matches!(result, Err(ClientError::Configuration(msg)) if msg.contains(API_KEY_VAR))
        );
    }

    #[test]
    fn test_from_vars_empty_secret() {
        let result =
            ClientConfig::from_vars(&vars(&[(API_KEY_VAR, "pk"), (API_SECRET_VAR, "")]));
        assert!(
            matches!(result, Err(ClientError::Configuration(msg)) if msg.contains(API_SECRET_VAR))
        );
    }

    #[test]
    fn test_from_vars_invalid_signing_mode() {
        let result = ClientConfig::from_vars(&vars(&[
            (API_KEY_VAR, "pk"),
            (API_SECRET_VAR, "secret"),
            (SIGNING_MODE_VAR, "none"),
        ]));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_widget_config_reads_identity_from_token() {
        let token = TestTokenBuilder::new()
            .for_subject("alice")
            .with_project_id(7)
            .sign_hmac(Algorithm::HS256, "secret");

        let config = WidgetConfig::new(SecretString::from(token))
            .unwrap()
            .with_api_url("http://localhost:3000/");

        assert_eq!(config.identity(), "alice");
        assert_eq!(config.project_id(), Some(7));
        assert_eq!(config.api_url(), "http://localhost:3000");
    }

    fn token_with_payload(payload: &serde_json::Value) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap())
        )
    }

    #[test]
    fn test_widget_config_needs_only_subject() {
        let token = token_with_payload(&json!({"sub": "alice", "projectId": 4}));

        let config = WidgetConfig::new(SecretString::from(token)).unwrap();

        assert_eq!(config.identity(), "alice");
        assert_eq!(config.project_id(), Some(4));
    }

    #[test]
    fn test_widget_config_rejects_token_without_subject() {
        let token = token_with_payload(&json!({"projectId": 4}));
        let result = WidgetConfig::new(SecretString::from(token));
        assert!(matches!(result, Err(ClientError::InvalidSignature)));
    }

    #[test]
    fn test_widget_config_rejects_empty_token() {
        let result = WidgetConfig::new(SecretString::from(""));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_widget_config_rejects_unreadable_token() {
        let result = WidgetConfig::new(SecretString::from("not-a-token"));
        assert!(matches!(result, Err(ClientError::InvalidSignature)));
    }

    #[test]
    fn test_widget_config_debug_redacts() {
        let token = TestTokenBuilder::new()
            .for_subject("alice-identity")
            .sign_hmac(Algorithm::HS256, "secret");
        let config = WidgetConfig::new(SecretString::from(token.clone())).unwrap();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains(&token));
        assert!(!debug_str.contains("alice-identity"));
    }
}
