//! Tools handlers: `tools/list` and `tools/call`.

use crate::ipc::protocol::{CallToolParams, ListToolsResult};
use crate::ipc::router::{parse_params, ServerContext};
use crate::types::Result;
use serde_json::Value;

pub fn list(ctx: &ServerContext) -> Result<Value> {
    let result = ListToolsResult {
        tools: ctx.adapter.list_tools(),
    };
    Ok(serde_json::to_value(result)?)
}

/// Tool failures are reported inside the result (`isError`), never as a
/// JSON-RPC error. Only malformed `params` produce one.
pub async fn call(ctx: &ServerContext, params: Option<Value>) -> Result<Value> {
    let params: CallToolParams = parse_params(params)?;
    let result = ctx.adapter.call_tool(&params.name, params.arguments).await;
    Ok(serde_json::to_value(result)?)
}
