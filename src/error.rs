//! Crate-wide error type.
//!
//! Library code returns `reelbrief::Result`; the binaries attach
//! top-level context with `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Errors surfaced by the reelbrief library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be resolved (missing or malformed values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The protocol-server executable could not be located.
    #[error(
        "protocol server not found at {0}; install reelbrief-mcp next to the \
         reelbrief binary or pass --server-bin"
    )]
    ServerBinaryMissing(PathBuf),

    /// A bridge session already owns a child process.
    #[error("a bridged session is already running in this process")]
    BridgeActive,

    /// Persistence-layer failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Credential resolution failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
