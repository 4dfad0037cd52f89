//! Key material resolution.
//!
//! Turns the configured secret key into the signing and verification keys
//! for one signing mode:
//!
//! - `RS256`: `sk_` + base64(PKCS#8 PEM). The prefix is stripped, the rest
//!   decoded to a PEM document, and the RSA private key parsed from it. The
//!   verification key is the public half derived from that private key.
//! - `HS256`: the secret's UTF-8 bytes, verbatim, for both directions.
//!
//! Resolution happens once per client. Rotating a secret means building a
//! new client; resolved keys are never mutated.

use crate::error::ClientError;
use crate::jwt::{SigningMode, SECRET_KEY_PREFIX};
use crate::secret::{ExposeSecret, SecretString};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};
use ring::signature::{KeyPair, RsaKeyPair};
use std::fmt;
use tracing::instrument;

/// PEM label of an unencrypted PKCS#8 private key.
const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";

/// Standard alphabet; trailing `=` padding optional.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Resolved signing and verification keys for one signing mode.
#[derive(Clone)]
pub struct KeyMaterial {
    mode: SigningMode,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("mode", &self.mode)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl KeyMaterial {
    /// Resolve the keys for `mode` from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::KeyFormat` if:
    /// - an `HS256` secret is empty
    /// - an `RS256` secret lacks the `sk_` prefix, is not valid base64, does
    ///   not decode to a UTF-8 PEM document, is not a PKCS#8 document, or
    ///   does not hold a usable RSA private key
    #[instrument(skip_all, fields(mode = %mode))]
    pub fn resolve(secret: &SecretString, mode: SigningMode) -> Result<Self, ClientError> {
        let material = match mode {
            SigningMode::Hs256 => Self::hmac(secret.expose_secret())?,
            SigningMode::Rs256 => Self::rsa(secret.expose_secret())?,
        };

        tracing::debug!(target: "tractorbeam.keys", mode = %mode, "Key material resolved");
        Ok(material)
    }

    /// The signing mode these keys belong to.
    #[must_use]
    pub fn mode(&self) -> SigningMode {
        self.mode
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    fn hmac(secret: &str) -> Result<Self, ClientError> {
        if secret.is_empty() {
            return Err(ClientError::KeyFormat(
                "HS256 secret must not be empty".into(),
            ));
        }

        let bytes = secret.as_bytes();
        Ok(Self {
            mode: SigningMode::Hs256,
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    fn rsa(secret: &str) -> Result<Self, ClientError> {
        let pem = decode_secret_pem(secret)?;
        let der = pkcs8_der_from_pem(&pem)?;

        // ring validates the whole key and yields the public half as an
        // RSAPublicKey DER, which is what DecodingKey::from_rsa_der expects.
        let key_pair = RsaKeyPair::from_pkcs8(&der).map_err(|e| {
            ClientError::KeyFormat(format!("Secret is not a usable RSA private key: {e}"))
        })?;
        let decoding = DecodingKey::from_rsa_der(key_pair.public_key().as_ref());

        let encoding = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            ClientError::KeyFormat(format!("Secret is not a usable RSA private key: {e}"))
        })?;

        Ok(Self {
            mode: SigningMode::Rs256,
            encoding,
            decoding,
        })
    }
}

/// Strip the `sk_` prefix and base64-decode the remainder into PEM text.
fn decode_secret_pem(secret: &str) -> Result<String, ClientError> {
    let encoded = secret.strip_prefix(SECRET_KEY_PREFIX).ok_or_else(|| {
        ClientError::KeyFormat(format!(
            "RS256 secret must start with \"{SECRET_KEY_PREFIX}\""
        ))
    })?;

    let pem_bytes = SECRET_ENGINE
        .decode(encoded)
        .map_err(|e| ClientError::KeyFormat(format!("Secret is not valid base64: {e}")))?;

    String::from_utf8(pem_bytes)
        .map_err(|_| ClientError::KeyFormat("Decoded secret is not a PEM document".into()))
}

/// Extract the DER body of a PKCS#8 `PRIVATE KEY` PEM document.
fn pkcs8_der_from_pem(pem: &str) -> Result<Vec<u8>, ClientError> {
    let begin = format!("-----BEGIN {PKCS8_PEM_LABEL}-----");
    let end = format!("-----END {PKCS8_PEM_LABEL}-----");

    let mut lines = pem.lines().map(str::trim).filter(|line| !line.is_empty());
    if lines.next() != Some(begin.as_str()) {
        return Err(ClientError::KeyFormat(format!(
            "Expected a PKCS#8 \"{PKCS8_PEM_LABEL}\" PEM document"
        )));
    }

    let mut body = String::new();
    let mut terminated = false;
    for line in lines {
        if line == end {
            terminated = true;
            break;
        }
        body.push_str(line);
    }
    if !terminated {
        return Err(ClientError::KeyFormat("PEM document is truncated".into()));
    }

    STANDARD
        .decode(body)
        .map_err(|e| ClientError::KeyFormat(format!("PEM body is not valid base64: {e}")))
}
