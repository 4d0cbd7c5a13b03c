//! Top-level router: routes by JSON-RPC method, delegates to handlers.

use crate::ipc::handlers;
use crate::tools::SheetsToolAdapter;
use crate::types::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Shared, immutable state handed to every handler.
#[derive(Debug)]
pub struct ServerContext {
    pub adapter: Arc<SheetsToolAdapter>,
    pub name: String,
    pub version: String,
}

impl ServerContext {
    pub fn new(adapter: Arc<SheetsToolAdapter>, name: impl Into<String>) -> Self {
        Self {
            adapter,
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Route a request to its handler and produce the `result` value.
pub async fn route_request(ctx: &ServerContext, method: &str, params: Option<Value>) -> Result<Value> {
    match method {
        "initialize" => handlers::lifecycle::initialize(ctx, params),
        "ping" => handlers::lifecycle::ping(),
        "tools/list" => handlers::tools::list(ctx),
        "tools/call" => handlers::tools::call(ctx, params).await,
        _ => Err(Error::not_found(format!("Method not found: {}", method))),
    }
}

/// Notifications carry no response; they are only logged.
pub fn route_notification(method: &str, params: Option<&Value>) {
    match method {
        "notifications/initialized" => tracing::info!("client initialized"),
        "notifications/cancelled" => {
            let request_id = params.and_then(|p| p.get("requestId")).cloned();
            tracing::debug!(?request_id, "client cancelled request");
        }
        other => tracing::debug!(method = other, "ignoring notification"),
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Decode `params` into `T`; absent params decode from `{}`.
pub fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T> {
    let value = params.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(value).map_err(|e| Error::validation(format!("Invalid params: {}", e)))
}
