//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over a token's unverified header and
//! payload.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {index}: {e}"))
}

fn header(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0)).expect("Failed to parse JWT header JSON")
}

fn claims(token: &str) -> Value {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims JSON")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_algorithm("RS256")
///     .assert_project_id(Some(1));
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a three-segment JWT with JSON header and payload
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the header `alg`
    fn assert_algorithm(&self, alg: &str) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert the `iss` claim
    fn assert_issued_by(&self, issuer: &str) -> &Self;

    /// Assert the `projectId` claim, where `None` means the claim is absent
    fn assert_project_id(&self, project_id: Option<i64>) -> &Self;

    /// Assert that `exp - iat` is exactly `seconds`
    fn assert_lifetime(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );
        assert!(
            parts.iter().all(|p| !p.is_empty()),
            "JWT segments must be non-empty"
        );

        let header = header(self);
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = claims(self);
        assert!(claims.is_object(), "JWT payload must be a JSON object");

        self
    }

    fn assert_algorithm(&self, alg: &str) -> &Self {
        assert_eq!(header(self).alg, alg, "Unexpected JWT algorithm");
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        assert_eq!(
            claims(self)["sub"],
            subject,
            "Token is not for subject '{subject}'"
        );
        self
    }

    fn assert_issued_by(&self, issuer: &str) -> &Self {
        assert_eq!(claims(self)["iss"], issuer, "Unexpected issuer");
        self
    }

    fn assert_project_id(&self, project_id: Option<i64>) -> &Self {
        let claims = claims(self);
        match project_id {
            Some(expected) => assert_eq!(
                claims.get("projectId").and_then(Value::as_i64),
                Some(expected),
                "Unexpected projectId claim"
            ),
            None => assert!(
                claims.get("projectId").is_none(),
                "projectId claim should be absent, found {}",
                claims["projectId"]
            ),
        }
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        let iat = claims["iat"].as_i64().expect("iat must be an integer");
        let exp = claims["exp"].as_i64().expect("exp must be an integer");
        assert_eq!(exp - iat, seconds, "Unexpected token lifetime");
        self
    }
}
