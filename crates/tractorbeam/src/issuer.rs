//! Token issuance.
//!
//! Every token carries `sub`, `iss`, optional `projectId`, and `iat = nbf`
//! with `exp` exactly six hours later. The header algorithm is always the
//! issuer's signing mode.

use crate::error::ClientError;
use crate::jwt::{Claims, SigningMode};
use crate::keys::KeyMaterial;
use jsonwebtoken::{encode, Header};
use std::sync::Arc;
use tracing::instrument;

/// Signs identity tokens for one publishable key.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    issuer: String,
    keys: Arc<KeyMaterial>,
}

impl TokenIssuer {
    /// Create an issuer that names `issuer` in `iss` and signs with `keys`.
    #[must_use]
    pub fn new(issuer: String, keys: Arc<KeyMaterial>) -> Self {
        Self { issuer, keys }
    }

    /// The signing mode of every token this issuer produces.
    #[must_use]
    pub fn mode(&self) -> SigningMode {
        self.keys.mode()
    }

    /// Issue a token for `identity`, scoped to `project_id` when given.
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidIdentity` if `identity` is empty
    /// - `ClientError::KeyFormat` if the resolved key cannot sign
    pub fn issue(&self, identity: &str, project_id: Option<i64>) -> Result<String, ClientError> {
        self.issue_at(identity, project_id, chrono::Utc::now().timestamp())
    }

    /// Deterministic issuance with an explicit `iat`.
    ///
    /// Prefer [`TokenIssuer::issue`] in production code.
    #[instrument(skip_all, fields(mode = %self.keys.mode(), scoped = project_id.is_some()))]
    pub(crate) fn issue_at(
        &self,
        identity: &str,
        project_id: Option<i64>,
        iat: i64,
    ) -> Result<String, ClientError> {
        if identity.is_empty() {
            return Err(ClientError::InvalidIdentity);
        }

        let claims = Claims::issue(identity.to_string(), self.issuer.clone(), project_id, iat);
        let header = Header::new(self.keys.mode().algorithm());

        let token = encode(&header, &claims, self.keys.encoding_key())
            .map_err(|e| ClientError::KeyFormat(format!("Token signing failed: {e}")))?;

        tracing::debug!(target: "tractorbeam.issuer", exp = claims.exp, "Token issued");
        Ok(token)
    }
}
