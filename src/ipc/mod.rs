//! Stdio JSON-RPC transport layer.
//!
//! Newline-delimited JSON-RPC 2.0 framing on stdin/stdout, carrying the MCP
//! `initialize`, `ping`, `tools/list` and `tools/call` methods.

pub mod codec;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;

pub use server::StdioServer;
