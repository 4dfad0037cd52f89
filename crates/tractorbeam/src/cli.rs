//! CLI argument definitions for the `tractorbeam` binary.
//!
//! Uses `clap` derive macros; each subcommand has its own argument struct.
//!
//! # Security
//!
//! The argument structs implement custom `Debug` to redact identities and
//! tokens.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use clap::{Parser, Subcommand};
use tractorbeam::ClientError;

/// Mint, verify, and query with Tractorbeam identity tokens.
///
/// Credentials come from `TRACTORBEAM_API_KEY` and `TRACTORBEAM_API_SECRET`.
#[derive(Debug, Parser)]
#[command(name = "tractorbeam")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override the API root (default: `TRACTORBEAM_API_URL` or the hosted API).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mint an identity token and print it.
    Mint(MintArgs),

    /// Verify a token and print its claims.
    Verify(VerifyArgs),

    /// Run a query on behalf of an identity.
    Query(QueryArgs),
}

/// Arguments for the `mint` subcommand.
#[derive(clap::Args)]
pub struct MintArgs {
    /// End user identity; becomes `sub`.
    pub identity: String,

    /// Project scope; becomes `projectId`.
    pub project_id: Option<i64>,
}

impl fmt::Debug for MintArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintArgs")
            .field("identity", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Arguments for the `verify` subcommand.
#[derive(clap::Args)]
pub struct VerifyArgs {
    /// The token to verify. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "token")]
    pub token_env: Option<String>,
}

impl fmt::Debug for VerifyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

impl VerifyArgs {
    /// Pick the token from the argument, the named variable in `vars`, or
    /// `input`, in that order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the named variable is unset,
    /// `input` cannot be read, or no token was found.
    pub fn resolve_token(
        &self,
        vars: &HashMap<String, String>,
        mut input: impl Read,
    ) -> Result<String, ClientError> {
        let token = if let Some(token) = &self.token {
            token.clone()
        } else if let Some(name) = &self.token_env {
            vars.get(name).cloned().ok_or_else(|| {
                ClientError::Configuration(format!("Environment variable {name} is not set"))
            })?
        } else {
            let mut buf = String::new();
            input
                .read_to_string(&mut buf)
                .map_err(|e| ClientError::Configuration(format!("Failed to read stdin: {e}")))?;
            buf
        };

        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Configuration(
                "No token provided: pass it as an argument, via --token-env, or through stdin"
                    .into(),
            ));
        }
        Ok(token.to_string())
    }
}

/// Arguments for the `query` subcommand.
#[derive(clap::Args)]
pub struct QueryArgs {
    /// End user identity to mint the token for.
    pub identity: String,

    /// Project scope of the token.
    pub project_id: i64,

    /// Query text.
    pub query: String,
}

impl fmt::Debug for QueryArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryArgs")
            .field("identity", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("query", &self.query)
            .finish()
    }
}
