//! # Reelbrief
//!
//! Tier-gated MCP gateway for video transcripts and brand rules.
//!
//! Reelbrief exposes a project's video transcripts and styling rules to
//! external coding/writing assistants over a JSON-RPC tool-invocation
//! protocol, gated by subscription tier. The companion `reelbrief
//! connect` command spawns the protocol server as a child process and
//! bridges its standard streams so IDEs and agents can talk to it as a
//! local MCP server.
//!
//! ## Key Pieces
//!
//! - **Dispatcher**: stateless per-request pipeline — authenticate,
//!   resolve tier, route the JSON-RPC method
//! - **Search**: case-insensitive literal snippet search over
//!   transcripts, bounded per video and per response
//! - **Tiers**: fail-to-free capability resolution from the billing
//!   collaborator
//! - **Bridge**: single-child subprocess supervision with signal
//!   forwarding and exit-code relay
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reelbrief::{Dispatcher, MemoryStore, StaticTokenAuth};
//!
//! # async fn demo() {
//! let store = Arc::new(MemoryStore::new());
//! let auth = Arc::new(StaticTokenAuth::default());
//! let dispatcher = Dispatcher::new(auth, store.clone(), store);
//!
//! let response = dispatcher
//!     .dispatch(Some("tok_live"), r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
//!     .await;
//! # let _ = response;
//! # }
//! ```

pub mod auth;
pub mod bridge;
pub mod config;
pub mod error;
pub mod mcp;
pub mod search;
pub mod store;
pub mod tiers;

// Re-exports for convenience
pub use error::{Error, Result};

pub use auth::{AuthError, AuthProvider, StaticTokenAuth};
pub use bridge::{connect, BridgeConfig};
pub use config::Config;
pub use mcp::dispatch::Dispatcher;
pub use search::{SearchEngine, SearchResults, VideoMatches};
pub use store::{
    ContentStore, MemoryStore, Project, Rule, StoreError, Subscription, SubscriptionStore,
    Transcript,
};
pub use tiers::{required_tier, Capability, Tier, TierResolver};
