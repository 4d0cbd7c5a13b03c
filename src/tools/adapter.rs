//! Tool adapter: decode, dispatch, call the backend once, render text.
//!
//! `call_tool` never fails: every outcome, including backend and credential
//! faults, becomes a single-text `ToolResult`.

use crate::sheets::{
    BackendProvider, BatchUpdateValuesRequest, InsertDataOption, LazyBackend, ValueInputOption,
    ValueRange,
};
use crate::tools::args::ToolCall;
use crate::tools::catalog::{ToolCatalog, ToolDescriptor, ToolName};
use crate::types::{Config, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

// =============================================================================
// Tool result
// =============================================================================

/// One content block of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Result of one tool invocation: always exactly one text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<Content>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the single content block.
    pub fn text_content(&self) -> &str {
        match self.content.first() {
            Some(Content::Text { text }) => text,
            None => "",
        }
    }
}

/// Render a failed invocation as tool text.
///
/// API faults get the `Google Sheets API error:` prefix; everything else
/// (arguments, credentials, transport, encoding) gets `Error:`.
pub fn render_error(err: &Error) -> String {
    if err.is_api_error() {
        format!("Google Sheets API error: {}", err)
    } else {
        format!("Error: {}", err)
    }
}

// =============================================================================
// Output payloads
// =============================================================================

#[derive(Serialize)]
struct ValuesOutput<'a> {
    values: &'a [Vec<Value>],
}

#[derive(Debug, Serialize)]
struct SpreadsheetInfo {
    title: Option<String>,
    sheets: Vec<SheetSummary>,
}

#[derive(Debug, Serialize)]
struct SheetSummary {
    title: String,
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    index: i64,
}

fn string_rows(rows: Vec<Vec<String>>) -> Vec<Vec<Value>> {
    rows.into_iter()
        .map(|row| row.into_iter().map(Value::String).collect())
        .collect()
}

// =============================================================================
// Adapter
// =============================================================================

/// Exposes the spreadsheet tools over a backend provider.
pub struct SheetsToolAdapter {
    catalog: ToolCatalog,
    provider: Arc<dyn BackendProvider>,
}

impl fmt::Debug for SheetsToolAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsToolAdapter")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl SheetsToolAdapter {
    pub fn new(provider: Arc<dyn BackendProvider>) -> Result<Self> {
        Ok(Self {
            catalog: ToolCatalog::new()?,
            provider,
        })
    }

    /// Adapter whose backend is built lazily from `config` credentials.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(Arc::new(LazyBackend::new(config.clone())))
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// The fixed tool catalog, in declaration order.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.catalog.list()
    }

    /// Invoke a tool by name. Never returns an error; see `render_error`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        let tool: ToolName = match name.parse() {
            Ok(tool) => tool,
            Err(_) => {
                tracing::info!(tool = %name, "unknown tool requested");
                return ToolResult::text(format!("Unknown tool: {}", name));
            }
        };

        let started = Instant::now();
        let result = self.invoke(tool, arguments).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(text) => {
                tracing::info!(tool = %tool, elapsed_ms, "tool call succeeded");
                ToolResult::text(text)
            }
            Err(err) => {
                let tier = if err.is_api_error() { "api" } else { "other" };
                tracing::warn!(tool = %tool, elapsed_ms, tier, error = %err, "tool call failed");
                ToolResult::error(render_error(&err))
            }
        }
    }

    async fn invoke(&self, tool: ToolName, arguments: Value) -> Result<String> {
        let arguments = match arguments {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };
        let problems = self.catalog.validate_params(tool, &arguments);
        if !problems.is_empty() {
            return Err(Error::validation(format!(
                "invalid arguments for {}: {}",
                tool,
                problems.join("; ")
            )));
        }
        let call = ToolCall::decode(tool, arguments)?;
        self.execute(call).await
    }

    /// Perform the single backend call for `call` and render its text.
    async fn execute(&self, call: ToolCall) -> Result<String> {
        let backend = self.provider.backend().await?;

        match call {
            ToolCall::ReadRange(args) => {
                let range = backend.get_values(&args.spreadsheet_id, &args.range).await?;
                Ok(serde_json::to_string_pretty(&ValuesOutput {
                    values: &range.values,
                })?)
            }

            ToolCall::UpdateRange(args) => {
                let response = backend
                    .update_values(
                        &args.spreadsheet_id,
                        &args.range,
                        string_rows(args.values),
                        ValueInputOption::UserEntered,
                    )
                    .await?;
                Ok(format!(
                    "Updated {} cells in range {}",
                    response.updated_cells.unwrap_or(0),
                    args.range
                ))
            }

            ToolCall::AppendRow(args) => {
                let row = string_rows(vec![args.values]);
                let response = backend
                    .append_values(
                        &args.spreadsheet_id,
                        &args.range,
                        row,
                        ValueInputOption::UserEntered,
                        InsertDataOption::InsertRows,
                    )
                    .await?;
                let updated_range = response
                    .updates
                    .and_then(|u| u.updated_range)
                    .unwrap_or_else(|| "(none)".to_string());
                Ok(format!(
                    "Appended row to {}. Updated range: {}",
                    args.range, updated_range
                ))
            }

            ToolCall::GetInfo(args) => {
                let spreadsheet = backend.get_spreadsheet(&args.spreadsheet_id).await?;
                let info = SpreadsheetInfo {
                    title: spreadsheet.properties.and_then(|p| p.title),
                    sheets: spreadsheet
                        .sheets
                        .into_iter()
                        .map(|sheet| SheetSummary {
                            title: sheet.properties.title,
                            sheet_id: sheet.properties.sheet_id,
                            index: sheet.properties.index,
                        })
                        .collect(),
                };
                Ok(serde_json::to_string_pretty(&info)?)
            }

            ToolCall::BatchUpdate(args) => {
                let submitted = args.updates.len();
                let request = BatchUpdateValuesRequest {
                    value_input_option: ValueInputOption::UserEntered,
                    data: args
                        .updates
                        .into_iter()
                        .map(|u| ValueRange::from_rows(u.range.to_string(), u.values))
                        .collect(),
                };
                let response = backend
                    .batch_update_values(&args.spreadsheet_id, request)
                    .await?;
                Ok(format!(
                    "Batch updated {} cells across {} ranges",
                    response.total_updated_cells.unwrap_or(0),
                    submitted
                ))
            }
        }
    }
}
