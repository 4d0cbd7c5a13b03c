//! Session lifecycle handlers: `initialize` and `ping`.

use crate::ipc::protocol::{
    negotiate_protocol_version, Implementation, InitializeParams, InitializeResult,
    ServerCapabilities, ToolsCapability,
};
use crate::ipc::router::{parse_params, ServerContext};
use crate::types::Result;
use serde_json::Value;

const INSTRUCTIONS: &str = "Google Sheets tools. Ranges use A1 notation (e.g. 'Sheet1!A1:D10'). \
Written values are interpreted as if typed by a user, so numbers, dates and formulas are parsed.";

pub fn initialize(ctx: &ServerContext, params: Option<Value>) -> Result<Value> {
    let params: InitializeParams = parse_params(params)?;
    let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());

    if let Some(client) = &params.client_info {
        tracing::info!(client = %client.name, client_version = %client.version, protocol_version, "initialize");
    }

    let result = InitializeResult {
        protocol_version: protocol_version.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
        },
        server_info: Implementation {
            name: ctx.name.clone(),
            version: ctx.version.clone(),
        },
        instructions: Some(format!(
            "{}\n\n{}",
            INSTRUCTIONS,
            ctx.adapter.catalog().generate_prompt()
        )),
    };
    Ok(serde_json::to_value(result)?)
}

pub fn ping() -> Result<Value> {
    Ok(Value::Object(serde_json::Map::new()))
}
