//! `tractorbeam` command-line tool.
//!
//! Reads credentials from the environment (`TRACTORBEAM_API_KEY`,
//! `TRACTORBEAM_API_SECRET`, optional `TRACTORBEAM_API_URL` and
//! `TRACTORBEAM_SIGNING_MODE`) and prints JSON to stdout. See `--help`.

mod cli;

use std::collections::HashMap;
use std::io::Read;

use clap::Parser;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tractorbeam::{ClientConfig, ClientError, CreateTokenOptions, QueryRequest, TractorbeamClient};

use crate::cli::{Cli, Commands};

async fn run(
    client: &TractorbeamClient,
    command: Commands,
    vars: &HashMap<String, String>,
    input: impl Read,
) -> Result<serde_json::Value, ClientError> {
    match command {
        Commands::Mint(args) => {
            let options = CreateTokenOptions {
                identity: args.identity,
                project_id: args.project_id,
            };
            let token = client.create_token(&options)?;
            Ok(json!({ "token": token }))
        }
        Commands::Verify(args) => {
            let token = args.resolve_token(vars, input)?;
            let claims = client.decode_token(&token)?;
            serde_json::to_value(claims).map_err(|e| ClientError::InvalidResponse(e.to_string()))
        }
        Commands::Query(args) => {
            client
                .query(QueryRequest::by_identity(
                    args.identity,
                    Some(args.project_id),
                    args.query,
                ))
                .await
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tractorbeam=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let vars: HashMap<String, String> = std::env::vars().collect();

    let mut config = ClientConfig::from_vars(&vars).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }

    let client = TractorbeamClient::new(config).map_err(|e| {
        error!("Failed to initialize client: {}", e);
        e
    })?;

    info!(mode = %client.signing_mode(), "Client ready");

    let output = run(&client, cli.command, &vars, std::io::stdin().lock()).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
