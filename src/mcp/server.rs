//! MCP JSON-RPC 2.0 server — reads requests from stdin, writes responses to stdout.
//!
//! The MCP protocol uses newline-delimited JSON over STDIO.
//! Tracing output goes to stderr so it doesn't interfere with the protocol.
//! Over this transport the bearer credential is fixed for the session:
//! the bridge forwards it through the environment and every request is
//! authenticated with it.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use super::dispatch::Dispatcher;
use super::types::JsonRpcResponse;

/// Run the server loop, reading JSON-RPC from stdin and writing to
/// stdout until stdin closes.
pub async fn run(dispatcher: Arc<Dispatcher>, bearer: Option<String>) -> std::io::Result<()> {
    info!("MCP server starting on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(request = %trimmed, "received request");

        if let Some(response) = dispatcher.dispatch(bearer.as_deref(), trimmed).await {
            write_response(&mut stdout, &response).await?;
        }
    }

    info!("MCP server shutting down");
    Ok(())
}

/// Write a JSON-RPC response to stdout (newline-delimited).
async fn write_response(
    stdout: &mut tokio::io::Stdout,
    response: &JsonRpcResponse,
) -> std::io::Result<()> {
    let json = serde_json::to_string(response).unwrap_or_default();
    debug!(response = %json, "sending response");
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
