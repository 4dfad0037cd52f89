//! Tractorbeam client SDK.
//!
//! Mints and verifies the short-lived identity tokens that bind an end user
//! (`sub`) and an optional project scope (`projectId`) to a publishable key,
//! and talks to the Tractorbeam API on that user's behalf.
//!
//! ```rust,ignore
//! use tractorbeam::client::{CreateTokenOptions, TractorbeamClient};
//! use tractorbeam::config::ClientConfig;
//! use tractorbeam::secret::SecretString;
//!
//! let config = ClientConfig::new("pk_live_123".to_string(), SecretString::from(secret));
//! let client = TractorbeamClient::new(config)?;
//!
//! let token = client.create_token(&CreateTokenOptions::new("user-42").with_project_id(7))?;
//! let claims = client.decode_token(&token)?;
//! assert_eq!(claims.project_id, Some(7));
//! ```

#![warn(clippy::pedantic)]

/// Error taxonomy shared by every operation
pub mod error;

/// Secret types that prevent accidental logging
pub mod secret;

/// Claim set, signing mode, and unverified token inspection
pub mod jwt;

/// Client and widget configuration
pub mod config;

/// Key material resolution from configured secrets
pub mod keys;

/// Token signing
pub mod issuer;

/// Token signature and time-window verification
pub mod verifier;

/// The client facade: issue, verify, and query
pub mod client;

/// Typed client for the connection and provider endpoints
pub mod connections;

pub use client::{CreateTokenOptions, QueryRequest, TractorbeamClient};
pub use config::{ClientConfig, WidgetConfig};
pub use error::ClientError;
pub use jwt::{Claims, SigningMode};
