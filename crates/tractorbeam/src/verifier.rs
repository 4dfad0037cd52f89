//! Token verification.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only the verifier's own signing mode is accepted; a token whose header
//!   names any other algorithm is rejected as an invalid signature
//! - `nbf <= now <= exp` is checked with no leeway, using the same clock as
//!   the issuer

use crate::error::ClientError;
use crate::jwt::{Claims, SigningMode, MAX_JWT_SIZE_BYTES};
use crate::keys::KeyMaterial;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Verifies tokens signed with one client's key material.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyMaterial>,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier pinned to the mode of `keys`.
    #[must_use]
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        let mut validation = Validation::new(keys.mode().algorithm());
        // Time claims are checked against an explicit clock in verify_at.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self { keys, validation }
    }

    /// The only algorithm this verifier accepts.
    #[must_use]
    pub fn mode(&self) -> SigningMode {
        self.keys.mode()
    }

    /// Verify `token` against the current time and return its claims.
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidSignature` - oversized, malformed, tampered,
    ///   signed with another key, or signed with another algorithm
    /// - `ClientError::TokenNotYetValid` - `now < nbf`
    /// - `ClientError::TokenExpired` - `now > exp`
    pub fn verify(&self, token: &str) -> Result<Claims, ClientError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Deterministic verification against an explicit `now` timestamp.
    ///
    /// Prefer [`TokenVerifier::verify`] in production code. This variant
    /// keeps verification a pure function of (token, now, key).
    ///
    /// # Errors
    ///
    /// Same as [`TokenVerifier::verify`].
    #[instrument(skip_all, fields(mode = %self.keys.mode()))]
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, ClientError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "tractorbeam.verifier",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(ClientError::InvalidSignature);
        }

        let token_data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                    ClientError::KeyFormat("Verification key is unusable".into())
                }
                _ => ClientError::InvalidSignature,
            })?;
        let claims = token_data.claims;

        if now < claims.nbf {
            return Err(ClientError::TokenNotYetValid);
        }
        if now > claims.exp {
            return Err(ClientError::TokenExpired);
        }

        tracing::debug!(target: "tractorbeam.verifier", "Token verified");
        Ok(claims)
    }
}
