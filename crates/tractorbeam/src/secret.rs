//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for the secret key, bearer tokens,
//! and the credential fields of connections. `SecretString` implements
//! `Debug` with redaction, so any struct that derives `Debug` while holding
//! one stays safe to log, and the value is zeroized on drop.
//!
//! ```rust
//! use tractorbeam::secret::{ExposeSecret, SecretString};
//!
//! let secret = SecretString::from("sk_...");
//! assert!(format!("{secret:?}").contains("REDACTED"));
//! assert_eq!(secret.expose_secret(), "sk_...");
//! ```
//!
//! Use `SecretString` for the API secret key, minted bearer tokens, and
//! OAuth/credential material returned by the connections API.

pub use secrecy::{ExposeSecret, SecretString};
