//! # Tractorbeam Test Utilities
//!
//! Shared test utilities for the Tractorbeam SDK.
//!
//! This crate provides:
//! - Fixed RSA key fixtures and `sk_`-encoded secret keys
//! - `TestTokenBuilder` for crafting arbitrary signed (or unsigned) tokens
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tractorbeam_test_utils::*;
//!
//! let secret = test_secret_key(1);
//!
//! let forged = TestTokenBuilder::new()
//!     .for_subject("mallory")
//!     .sign_hmac(jsonwebtoken::Algorithm::HS384, "test_api_secret");
//!
//! token
//!     .assert_valid_jwt()
//!     .assert_for_subject("alice")
//!     .assert_lifetime(21_600);
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use token_builders::*;
