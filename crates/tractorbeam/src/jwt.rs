//! Token claims, signing modes, and unverified inspection.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - [`peek_claims`] does NOT verify anything; it exists for consumers that
//!   only display identity information and leave verification to the API
//! - The `sub` field in [`Claims`] is redacted in Debug output

use crate::error::ClientError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Checked before any base64 decoding or signature work. Issued tokens are
/// a few hundred bytes (HS256) to roughly 600 bytes (RS256).
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Lifetime of every issued token.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(6 * 60 * 60);

/// Literal prefix marking an asymmetric secret key.
///
/// The prefix is added after base64 encoding, so it is stripped before
/// decoding.
pub const SECRET_KEY_PREFIX: &str = "sk_";

// =============================================================================
// Signing Mode
// =============================================================================

/// Signing algorithm of one client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningMode {
    /// RSA PKCS#1 v1.5 with SHA-256. The secret is an `sk_`-prefixed,
    /// base64-encoded PKCS#8 PEM document.
    Rs256,
    /// HMAC with SHA-256. The secret string's UTF-8 bytes are the key.
    Hs256,
}

impl SigningMode {
    /// Pick the mode implied by the shape of a secret key.
    ///
    /// `sk_`-prefixed secrets are RSA private keys; anything else is a
    /// shared HMAC secret.
    #[must_use]
    pub fn detect(secret: &str) -> Self {
        if secret.starts_with(SECRET_KEY_PREFIX) {
            Self::Rs256
        } else {
            Self::Hs256
        }
    }

    /// The `jsonwebtoken` algorithm for this mode.
    #[must_use]
    pub fn algorithm(self) -> Algorithm {
        match self {
            Self::Rs256 => Algorithm::RS256,
            Self::Hs256 => Algorithm::HS256,
        }
    }

    /// The `alg` header value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Hs256 => "HS256",
        }
    }
}

impl fmt::Display for SigningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RS256" => Ok(Self::Rs256),
            "HS256" => Ok(Self::Hs256),
            other => Err(ClientError::Configuration(format!(
                "Unsupported signing mode: {other}"
            ))),
        }
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Claim set carried by every Tractorbeam token.
///
/// `projectId` is omitted from the payload when absent, never sent as
/// `null`. Claims added by other issuers are kept in `custom`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the end user's identity. Redacted in Debug output.
    pub sub: String,

    /// Issuer: the publishable key that minted the token.
    pub iss: String,

    /// Tenant/project scope.
    #[serde(
        rename = "projectId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<i64>,

    /// Issued-at (Unix epoch seconds).
    pub iat: i64,

    /// Not-before (Unix epoch seconds). Defaults to the epoch when absent.
    #[serde(default)]
    pub nbf: i64,

    /// Expiration (Unix epoch seconds).
    pub exp: i64,

    /// Any other claims present in the payload.
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("project_id", &self.project_id)
            .field("iat", &self.iat)
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Claims {
    /// Build the claim set for a token issued at `iat`.
    ///
    /// `nbf` equals `iat` and `exp` is exactly [`TOKEN_LIFETIME`] later.
    #[must_use]
    pub fn issue(sub: String, iss: String, project_id: Option<i64>, iat: i64) -> Self {
        // TOKEN_LIFETIME is a small constant, well within i64 range
        #[allow(clippy::cast_possible_wrap)]
        let lifetime_secs = TOKEN_LIFETIME.as_secs() as i64;
        Self {
            sub,
            iss,
            project_id,
            iat,
            nbf: iat,
            exp: iat + lifetime_secs,
            custom: serde_json::Map::new(),
        }
    }

    /// Look up a claim that is not part of the standard set.
    #[must_use]
    pub fn custom_claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.custom.get(name)
    }
}

// =============================================================================
// Unverified Inspection
// =============================================================================

/// Header fields read during inspection.
#[derive(Deserialize)]
struct InspectedHeader {
    alg: String,
}

/// Split a compact token into its three segments after the size check.
fn segments(token: &str) -> Result<(&str, &str, &str), ClientError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "tractorbeam.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(ClientError::InvalidSignature);
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(ClientError::InvalidSignature),
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, ClientError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| ClientError::InvalidSignature)?;
    serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidSignature)
}

/// Read the `alg` header value of a token without verifying it.
///
/// # Errors
///
/// Returns `ClientError::InvalidSignature` if the token is oversized, not
/// three segments, or its header is not base64url JSON with a string `alg`.
pub fn header_algorithm(token: &str) -> Result<String, ClientError> {
    let (header, _, _) = segments(token)?;
    let header: InspectedHeader = decode_segment(header)?;
    Ok(header.alg)
}

/// Read a token's claims WITHOUT verifying its signature or time window.
///
/// Only for display purposes (e.g. showing which identity a widget acts
/// for); anything that grants access must use the verifier.
///
/// # Errors
///
/// Returns `ClientError::InvalidSignature` if the token is oversized, not
/// three segments, or its payload is not a valid claim set.
pub fn peek_claims(token: &str) -> Result<Claims, ClientError> {
    peek_payload(token)
}

/// Read the payload into any shape, for callers that need only a few claims.
pub(crate) fn peek_payload<T: serde::de::DeserializeOwned>(
    token: &str,
) -> Result<T, ClientError> {
    let (_, payload, _) = segments(token)?;
    decode_segment(payload)
}

// =============================================================================
// Tests
// =============================================================================
