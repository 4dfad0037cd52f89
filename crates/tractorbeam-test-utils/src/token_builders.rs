//! Builder patterns for test token construction
//!
//! Provides a fluent API for tokens the issuer would never produce: other
//! algorithms, custom claims, odd time windows, missing claims.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Six hours, the lifetime of issued tokens.
const DEFAULT_LIFETIME_SECS: i64 = 21_600;

/// Builder for creating test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice")
///     .with_project_id(7)
///     .with_claim("role", json!("admin"))
///     .sign_hmac(Algorithm::HS256, "test_api_secret");
/// ```
pub struct TestTokenBuilder {
    sub: Option<String>,
    iss: String,
    project_id: Option<i64>,
    iat: i64,
    nbf: i64,
    exp: i64,
    extra: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: Some("test-subject".to_string()),
            iss: "test_api_key".to_string(),
            project_id: None,
            iat: now,
            nbf: now,
            exp: now + DEFAULT_LIFETIME_SECS,
            extra: Map::new(),
        }
    }

    /// Set the subject (end user identity)
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = Some(subject.to_string());
        self
    }

    /// Drop the `sub` claim entirely
    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Set the issuer (publishable key)
    pub fn issued_by(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    /// Set the `projectId` claim
    pub fn with_project_id(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Set `iat`, moving `nbf` and `exp` along with it
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self.nbf = timestamp;
        self.exp = timestamp + DEFAULT_LIFETIME_SECS;
        self
    }

    /// Set `nbf`
    pub fn not_before(mut self, timestamp: i64) -> Self {
        self.nbf = timestamp;
        self
    }

    /// Set `exp`
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// Add a custom claim
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        let mut claims = self.extra;
        if let Some(sub) = self.sub {
            claims.insert("sub".into(), json!(sub));
        }
        claims.insert("iss".into(), json!(self.iss));
        if let Some(project_id) = self.project_id {
            claims.insert("projectId".into(), json!(project_id));
        }
        claims.insert("iat".into(), json!(self.iat));
        claims.insert("nbf".into(), json!(self.nbf));
        claims.insert("exp".into(), json!(self.exp));
        Value::Object(claims)
    }

    /// The base64url payload segment, for splicing into other tokens
    pub fn encoded_payload(self) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&self.build()).unwrap())
    }

    /// Sign with an HMAC algorithm and a shared secret
    pub fn sign_hmac(self, alg: Algorithm, secret: &str) -> String {
        let key = EncodingKey::from_secret(secret.as_bytes());
        encode(&Header::new(alg), &self.build(), &key).expect("HMAC signing failed")
    }

    /// Sign with an RSA algorithm and a PKCS#8 PEM private key
    pub fn sign_rsa(self, alg: Algorithm, pem: &str) -> String {
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Invalid RSA PEM fixture");
        encode(&Header::new(alg), &self.build(), &key).expect("RSA signing failed")
    }

    /// An `alg: none` token with an empty signature segment
    pub fn unsigned(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        format!("{header}.{}.", self.encoded_payload())
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
