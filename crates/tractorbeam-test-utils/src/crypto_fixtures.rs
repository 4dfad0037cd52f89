//! Fixed cryptographic fixtures for testing
//!
//! RSA-2048 keys are checked in as PKCS#8 PEM files so every run signs with
//! the same material without generating keys at test time.

use base64::engine::general_purpose;
use base64::Engine;

const RSA_SIGNING_KEY_1: &str = include_str!("fixtures/rsa_signing_key_1.pem");
const RSA_SIGNING_KEY_2: &str = include_str!("fixtures/rsa_signing_key_2.pem");
const RSA_SIGNING_KEY_PKCS1: &str = include_str!("fixtures/rsa_signing_key_pkcs1.pem");
const ED25519_SIGNING_KEY: &str = include_str!("fixtures/ed25519_signing_key.pem");

/// Return one of the fixed RSA-2048 private keys as PKCS#8 PEM.
///
/// # Arguments
/// * `seed` - Fixture number (1 or 2). Different numbers are different keys.
///
/// # Panics
/// Panics for any other fixture number.
pub fn test_rsa_pem(seed: u8) -> &'static str {
    match seed {
        1 => RSA_SIGNING_KEY_1,
        2 => RSA_SIGNING_KEY_2,
        other => panic!("no RSA fixture numbered {other}; use 1 or 2"),
    }
}

/// RSA fixture 1 in the traditional PKCS#1 (`RSA PRIVATE KEY`) encoding.
pub fn test_rsa_pkcs1_pem() -> &'static str {
    RSA_SIGNING_KEY_PKCS1
}

/// An Ed25519 private key in PKCS#8 PEM (a valid document of the wrong key type).
pub fn test_ed25519_pem() -> &'static str {
    ED25519_SIGNING_KEY
}

/// Encode a PEM document the way secret keys are distributed: `sk_` + base64.
pub fn encode_secret_key(pem: &str) -> String {
    format!("sk_{}", general_purpose::STANDARD.encode(pem))
}

/// A ready-to-use RS256 secret key string for fixture `seed`.
///
/// # Example
/// ```rust,ignore
/// let config = ClientConfig::new("pk_test".into(), SecretString::from(test_secret_key(1)));
/// ```
pub fn test_secret_key(seed: u8) -> String {
    encode_secret_key(test_rsa_pem(seed))
}
