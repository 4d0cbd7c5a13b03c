//! Core types for the sheets tool server.
//!
//! - **IDs**: Validated identifiers (SpreadsheetId, A1Range)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Credential, backend, server and observability settings

mod config;
mod errors;
mod ids;

pub use config::{
    BackendConfig, Config, CredentialsConfig, ObservabilityConfig, ServerConfig,
    DEFAULT_SHEETS_BASE_URL,
};
pub use errors::{Error, Result};
pub use ids::{A1Range, SpreadsheetId};
