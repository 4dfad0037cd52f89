//! Error types for the Tractorbeam SDK.
//!
//! Every failure is local to the call that produced it: a client stays
//! usable after any error. Messages never include secret key material or
//! token contents.

use thiserror::Error;

/// Errors returned by token, query, and connections operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The configured secret could not be turned into a signing key.
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// Token is forged, corrupted, malformed, or names the wrong algorithm.
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Current time is past the token's `exp`.
    #[error("Token has expired")]
    TokenExpired,

    /// Current time is before the token's `nbf`.
    #[error("Token is not yet valid")]
    TokenNotYetValid,

    /// The identity passed to the issuer was empty.
    #[error("Identity must not be empty")]
    InvalidIdentity,

    /// The remote API answered with a non-2xx status.
    #[error("Remote query failed: {status} {status_text}")]
    RemoteQuery {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
    },

    /// The request never produced a response (connect, TLS, I/O).
    #[error("HTTP client error: {0}")]
    Http(String),

    /// The request could not be built, e.g. a bearer token that is not a
    /// valid header value. Sending it again fails the same way.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A successful response carried a body that could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether repeating the same call might succeed.
    ///
    /// The SDK never retries on its own; this is a hint for callers that do.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::RemoteQuery { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify a transport failure. Builder errors are permanent; everything
    /// else happened on the wire.
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }

    /// Build a `RemoteQuery` error from a response status.
    pub(crate) fn remote(status: reqwest::StatusCode) -> Self {
        Self::RemoteQuery {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

/// Result type alias using `ClientError`
pub type Result<T> = std::result::Result<T, ClientError>;
