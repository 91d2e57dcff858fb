//! MCP (Model Context Protocol) gateway module.
//!
//! Provides a JSON-RPC 2.0 interface — over STDIO for bridged local
//! sessions, over HTTP POST for the hosted variant — through which
//! external agents search transcripts and read brand rules.

pub mod dispatch;
pub mod http;
pub mod server;
pub mod tools;
pub mod types;
