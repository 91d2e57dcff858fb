//! Reelbrief CLI - connect an IDE or AI agent to the protocol server.
//!
//! Usage:
//!   reelbrief connect            # spawn reelbrief-mcp, bridge its stdio
//!   reelbrief tools              # print the tool descriptor set

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use reelbrief::BridgeConfig;

#[derive(Parser)]
#[command(name = "reelbrief")]
#[command(about = "Reelbrief - transcripts and brand rules for AI agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn the local protocol server and bridge its standard streams
    /// to this terminal until either side exits
    Connect {
        /// Path to the reelbrief-mcp executable (default: sibling of this binary)
        #[arg(long)]
        server_bin: Option<PathBuf>,

        /// Document-store URL forwarded as REELBRIEF_DB_URL
        #[arg(long)]
        db_url: Option<String>,

        /// Database name forwarded as REELBRIEF_DB_NAME
        #[arg(long)]
        db_name: Option<String>,

        /// Bearer token the session authenticates with, forwarded as
        /// REELBRIEF_API_TOKEN
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the static tool descriptors as JSON
    Tools,
}

fn main() {
    // Keep stdout clean: when bridging, it belongs to the protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Connect {
            server_bin,
            db_url,
            db_name,
            token,
        } => {
            // Blocks for the whole bridged session; the bridge's exit
            // code is the child's.
            let code = reelbrief::connect(BridgeConfig {
                server_bin,
                db_url,
                db_name,
                token,
            })?;
            Ok(code)
        }

        Commands::Tools => {
            let tools = reelbrief::mcp::tools::list_tools();
            println!("{}", serde_json::to_string_pretty(&tools)?);
            Ok(0)
        }
    }
}
