//! Reelbrief MCP Server — transcripts and brand rules for AI agents.
//!
//! Runs a JSON-RPC 2.0 server that exposes a project's transcripts and
//! rules through the Model Context Protocol (MCP), tier-gated per
//! request.
//!
//! Usage:
//!   reelbrief-mcp [--listen ADDR]
//!
//! Without `--listen` the server speaks newline-delimited JSON-RPC over
//! STDIO (the transport the `reelbrief connect` bridge expects); with it,
//! the hosted HTTP variant is served on ADDR. Configuration comes from
//! REELBRIEF_* environment variables over an optional reelbrief.toml.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use reelbrief::{Config, Dispatcher, StaticTokenAuth};

#[tokio::main]
async fn main() {
    // Initialize tracing to stderr (MCP uses stdout for protocol)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let mut listen_flag: Option<String> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--listen" => {
                listen_flag = Some(args.next().context("--listen requires an address")?);
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    let config = Config::resolve();

    // Fail fast with an actionable diagnostic; never hang waiting for a
    // store nobody configured.
    let db_url = config.require_db_url()?;
    info!(db = %config.db_name, url = %db_url, "opening document store");
    let (store, seed_tokens) = reelbrief::store::open(db_url)?;
    let store = Arc::new(store);

    let auth = match &config.tokens {
        Some(raw) => StaticTokenAuth::from_env_value(raw),
        None => StaticTokenAuth::new(seed_tokens),
    };
    if auth.is_empty() {
        warn!("no API tokens configured; every request will be rejected as unauthenticated");
    }

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(auth), store.clone(), store));

    match listen_flag.or_else(|| config.listen.clone()) {
        Some(addr) => reelbrief::mcp::http::serve(&addr, dispatcher).await?,
        None => {
            info!("MCP server ready — waiting for JSON-RPC requests on stdin");
            reelbrief::mcp::server::run(dispatcher, config.api_token.clone()).await?;
        }
    }

    Ok(())
}
