//! Token round trips through the public API
//!
//! Covers both signing modes end to end: a client built from a credential
//! pair mints a token and a client with the same pair verifies it.

use tractorbeam::secret::SecretString;
use tractorbeam::{ClientConfig, ClientError, CreateTokenOptions, SigningMode, TractorbeamClient};
use tractorbeam_test_utils::{test_secret_key, TestTokenBuilder, TokenAssertions};

fn hs256_client() -> TractorbeamClient {
    let config = ClientConfig::new(
        "test_api_key".to_string(),
        SecretString::from("test_api_secret"),
    );
    TractorbeamClient::new(config).expect("HS256 client should build")
}

fn rs256_client(seed: u8) -> TractorbeamClient {
    let config = ClientConfig::new(
        "pk_live_123".to_string(),
        SecretString::from(test_secret_key(seed)),
    );
    TractorbeamClient::new(config).expect("RS256 client should build")
}

// ============================================================================
// Documented scenario
// ============================================================================

/// Mint for `test_identity` in project 1, then decode it with the same client.
#[test]
fn test_create_then_decode_token() -> Result<(), anyhow::Error> {
    // Arrange
    let client = hs256_client();

    // Act
    let token =
        client.create_token(&CreateTokenOptions::new("test_identity").with_project_id(1))?;
    let claims = client.decode_token(&token)?;

    // Assert
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(claims.project_id, Some(1));
    assert_eq!(claims.sub, "test_identity");
    assert_eq!(claims.iss, "test_api_key");

    Ok(())
}

// ============================================================================
// RS256
// ============================================================================

#[test]
fn test_rs256_round_trip() -> Result<(), anyhow::Error> {
    let client = rs256_client(1);
    assert_eq!(client.signing_mode(), SigningMode::Rs256);

    let token = client.create_token(&CreateTokenOptions::new("user-42").with_project_id(7))?;

    token
        .assert_valid_jwt()
        .assert_algorithm("RS256")
        .assert_for_subject("user-42")
        .assert_issued_by("pk_live_123")
        .assert_project_id(Some(7))
        .assert_lifetime(21_600);

    let claims = client.decode_token(&token)?;
    assert_eq!(claims.nbf, claims.iat);
    assert_eq!(claims.exp - claims.iat, 21_600);

    Ok(())
}

/// Two instances built from the same credential pair agree on tokens.
#[test]
fn test_independent_clients_with_same_secret_agree() -> Result<(), anyhow::Error> {
    let issuer = rs256_client(1);
    let verifier = rs256_client(1);

    let token = issuer.create_token(&CreateTokenOptions::new("alice"))?;
    let claims = verifier.decode_token(&token)?;

    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.project_id, None);
    Ok(())
}

/// Rotating the secret means building a new client; old tokens stop verifying.
#[test]
fn test_rotated_secret_rejects_old_tokens() -> Result<(), anyhow::Error> {
    let old = rs256_client(1);
    let rotated = rs256_client(2);

    let token = old.create_token(&CreateTokenOptions::new("alice"))?;

    assert_eq!(
        rotated.decode_token(&token).unwrap_err(),
        ClientError::InvalidSignature
    );
    Ok(())
}

#[test]
fn test_malformed_rsa_secret_fails_at_construction() {
    let config = ClientConfig::new(
        "pk".to_string(),
        SecretString::from("sk_bm90LWEtcGVt"),
    );

    let result = TractorbeamClient::new(config);
    assert!(matches!(result, Err(ClientError::KeyFormat(_))));
}

// ============================================================================
// Claim shape
// ============================================================================

#[test]
fn test_unscoped_token_omits_project_id() -> Result<(), anyhow::Error> {
    let client = hs256_client();

    let token = client.create_token(&CreateTokenOptions::new("alice"))?;

    token.assert_project_id(None);
    assert_eq!(client.decode_token(&token)?.project_id, None);
    Ok(())
}

#[test]
fn test_empty_identity_is_rejected() {
    let client = hs256_client();

    let result = client.create_token(&CreateTokenOptions::new(""));
    assert_eq!(result.unwrap_err(), ClientError::InvalidIdentity);
}

/// Tokens minted elsewhere with the shared secret keep their custom claims.
#[test]
fn test_foreign_token_custom_claims_are_preserved() -> Result<(), anyhow::Error> {
    let client = hs256_client();
    let token = TestTokenBuilder::new()
        .for_subject("alice")
        .issued_by("test_api_key")
        .with_claim("role", serde_json::json!("admin"))
        .sign_hmac(jsonwebtoken::Algorithm::HS256, "test_api_secret");

    let claims = client.decode_token(&token)?;

    assert_eq!(claims.custom_claim("role"), Some(&serde_json::json!("admin")));
    Ok(())
}

#[test]
fn test_expired_token_is_rejected() {
    let client = hs256_client();
    let issued = chrono::Utc::now().timestamp() - 30_000;
    let token = TestTokenBuilder::new()
        .issued_at(issued)
        .sign_hmac(jsonwebtoken::Algorithm::HS256, "test_api_secret");

    assert_eq!(
        client.decode_token(&token).unwrap_err(),
        ClientError::TokenExpired
    );
}

#[test]
fn test_widget_config_carries_identity_and_api_url() -> Result<(), anyhow::Error> {
    let config = ClientConfig::new(
        "test_api_key".to_string(),
        SecretString::from("test_api_secret"),
    )
    .with_api_url("http://localhost:4000/");
    let client = TractorbeamClient::new(config)?;

    let widget =
        client.create_widget_config(&CreateTokenOptions::new("alice").with_project_id(2))?;

    assert_eq!(widget.identity(), "alice");
    assert_eq!(widget.project_id(), Some(2));
    assert_eq!(widget.api_url(), "http://localhost:4000");
    Ok(())
}
