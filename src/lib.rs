//! # sheets-mcp - Google Sheets tools over MCP
//!
//! Exposes five spreadsheet operations as MCP tools:
//! - `read_range`: read cell values from an A1 range
//! - `update_range`: overwrite a range with a 2D grid
//! - `append_row`: append one row below a table
//! - `get_info`: spreadsheet title and sheet tabs
//! - `batch_update`: write several ranges in one call
//!
//! ## Architecture
//!
//! ```text
//!   stdin  →  ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐
//!             │ ipc::server  │ →  │ SheetsToolAdapter │ →  │ SheetsBackend │ → Sheets API v4
//!   stdout ←  │  (JSON-RPC)  │    │ catalog + dispatch│    │ (REST client) │
//!             └──────────────┘    └──────────────────┘    └──────────────┘
//! ```
//!
//! The backend is built lazily on the first tool call that needs it, so the
//! server starts and lists tools without credentials.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod ipc;
pub mod sheets;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use tools::SheetsToolAdapter;
pub use types::{Config, Error, Result};
