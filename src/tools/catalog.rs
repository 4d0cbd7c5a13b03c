//! Tool catalog: fixed tool set, generated input schemas, argument validation.
//!
//! The five tools are a closed enum. Their input schemas are generated from
//! the argument structs in `args.rs` and compiled once into validators, so the
//! contract advertised by `tools/list` is the one enforced on `tools/call`.

use crate::tools::args::{
    AppendRowArgs, BatchUpdateArgs, GetInfoArgs, ReadRangeArgs, UpdateRangeArgs,
};
use crate::types::{Error, Result};
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Tool names
// =============================================================================

/// The fixed set of tools, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ReadRange,
    UpdateRange,
    AppendRow,
    GetInfo,
    BatchUpdate,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::ReadRange,
        ToolName::UpdateRange,
        ToolName::AppendRow,
        ToolName::GetInfo,
        ToolName::BatchUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ReadRange => "read_range",
            ToolName::UpdateRange => "update_range",
            ToolName::AppendRow => "append_row",
            ToolName::GetInfo => "get_info",
            ToolName::BatchUpdate => "batch_update",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ReadRange => "Read data from a Google Sheets range",
            ToolName::UpdateRange => "Update data in a Google Sheets range",
            ToolName::AppendRow => "Append a new row to a Google Sheet",
            ToolName::GetInfo => "Get spreadsheet metadata and sheet information",
            ToolName::BatchUpdate => "Update multiple ranges in a Google Sheet",
        }
    }

    fn input_schema(&self) -> Result<Value> {
        match self {
            ToolName::ReadRange => schema_for::<ReadRangeArgs>(),
            ToolName::UpdateRange => schema_for::<UpdateRangeArgs>(),
            ToolName::AppendRow => schema_for::<AppendRowArgs>(),
            ToolName::GetInfo => schema_for::<GetInfoArgs>(),
            ToolName::BatchUpdate => schema_for::<BatchUpdateArgs>(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = Error;

    /// Exact, case-sensitive match against the catalog names.
    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", s)))
    }
}

/// Inline draft-07 schema for `T`, without the `$schema`/`title` envelope.
fn schema_for<T: JsonSchema>() -> Result<Value> {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut schema = serde_json::to_value(root)?;
    if let Value::Object(map) = &mut schema {
        map.remove("title");
        map.remove("definitions");
    }
    Ok(schema)
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Public description of one tool, as returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Names listed under the schema's `required` key.
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Generate a prompt line for this tool.
    ///
    /// Format: `- tool_name(param1: type, param2?: type): description`
    pub fn to_prompt_line(&self) -> String {
        let required = self.required_params();
        let params: Vec<String> = self
            .input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, schema)| {
                        let optional = if required.contains(&name.as_str()) { "" } else { "?" };
                        format!("{}{}: {}", name, optional, display_type(schema))
                    })
                    .collect()
            })
            .unwrap_or_default();

        format!("- {}({}): {}", self.name, params.join(", "), self.description)
    }
}

/// Compact type name for prompt lines: `string`, `string[]`, `string[][]`, `object[]`.
fn display_type(schema: &Value) -> String {
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => match schema.get("items") {
            Some(items) => format!("{}[]", display_type(items)),
            None => "array".to_string(),
        },
        Some(other) => other.to_string(),
        None => "any".to_string(),
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

struct CatalogEntry {
    name: ToolName,
    descriptor: ToolDescriptor,
    validator: jsonschema::Validator,
}

/// Immutable catalog of the five tools. Built once at startup.
pub struct ToolCatalog {
    entries: Vec<CatalogEntry>,
}

impl fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.entries.iter().map(|e| e.name).collect::<Vec<_>>())
            .finish()
    }
}

impl ToolCatalog {
    pub fn new() -> Result<Self> {
        let entries = ToolName::ALL
            .into_iter()
            .map(|name| {
                let input_schema = name.input_schema()?;
                let validator = jsonschema::validator_for(&input_schema).map_err(|e| {
                    Error::internal(format!("invalid input schema for {}: {}", name, e))
                })?;
                Ok(CatalogEntry {
                    name,
                    descriptor: ToolDescriptor {
                        name: name.as_str().to_string(),
                        description: name.description().to_string(),
                        input_schema,
                    },
                    validator,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// All descriptors, in declaration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn get(&self, name: ToolName) -> Option<&ToolDescriptor> {
        self.entry(name).map(|e| &e.descriptor)
    }

    fn entry(&self, name: ToolName) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Validate arguments against a tool's input schema.
    ///
    /// Returns a list of validation errors (empty = valid).
    pub fn validate_params(&self, name: ToolName, params: &Value) -> Vec<String> {
        match self.entry(name) {
            Some(entry) => entry
                .validator
                .iter_errors(params)
                .map(|e| e.to_string())
                .collect(),
            None => vec![format!("Unknown tool: {}", name)],
        }
    }

    /// Generate formatted prompt section for hosts that render a text tool list.
    pub fn generate_prompt(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push("Available tools:".to_string());
        for entry in &self.entries {
            lines.push(entry.descriptor.to_prompt_line());
        }
        lines.join("\n")
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn catalog() -> ToolCatalog {
        ToolCatalog::new().unwrap()
    }

    #[test]
    fn test_lists_five_tools_in_order() {
        let names: Vec<String> = catalog().list().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["read_range", "update_range", "append_row", "get_info", "batch_update"]
        );
    }

    #[test]
    fn test_required_params_match_contract() {
        let catalog = catalog();
        let required = |name: ToolName| {
            let mut req: Vec<String> = catalog
                .get(name)
                .unwrap()
                .required_params()
                .into_iter()
                .map(String::from)
                .collect();
            req.sort();
            req
        };

        assert_eq!(required(ToolName::ReadRange), vec!["range", "spreadsheet_id"]);
        assert_eq!(
            required(ToolName::UpdateRange),
            vec!["range", "spreadsheet_id", "values"]
        );
        assert_eq!(
            required(ToolName::AppendRow),
            vec!["range", "spreadsheet_id", "values"]
        );
        assert_eq!(required(ToolName::GetInfo), vec!["spreadsheet_id"]);
        assert_eq!(
            required(ToolName::BatchUpdate),
            vec!["spreadsheet_id", "updates"]
        );
    }

    #[test]
    fn test_schema_shapes() {
        let catalog = catalog();

        let update = &catalog.get(ToolName::UpdateRange).unwrap().input_schema;
        assert_eq!(update["type"], "object");
        assert_eq!(update["properties"]["values"]["type"], "array");
        assert_eq!(update["properties"]["values"]["items"]["type"], "array");
        assert_eq!(update["properties"]["values"]["items"]["items"]["type"], "string");

        let append = &catalog.get(ToolName::AppendRow).unwrap().input_schema;
        assert_eq!(append["properties"]["values"]["items"]["type"], "string");
        assert_eq!(
            append["properties"]["values"]["description"],
            "Array of values for the new row"
        );

        let batch = &catalog.get(ToolName::BatchUpdate).unwrap().input_schema;
        let item = &batch["properties"]["updates"]["items"];
        assert_eq!(item["type"], "object");
        assert_eq!(item["properties"]["values"]["items"]["items"]["type"], "string");
        assert!(batch.get("$schema").is_none());
        assert!(batch.get("definitions").is_none());
    }

    #[test]
    fn test_tool_name_exact_match() {
        assert_eq!("read_range".parse::<ToolName>().unwrap(), ToolName::ReadRange);
        assert!("READ_RANGE".parse::<ToolName>().is_err());
        assert!("sheets_read_range".parse::<ToolName>().is_err());
        assert!(" read_range".parse::<ToolName>().is_err());
    }

    #[test]
    fn test_validate_params_valid() {
        let errors = catalog().validate_params(
            ToolName::ReadRange,
            &json!({"spreadsheet_id": "abc", "range": "A1"}),
        );
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_validate_params_missing_required() {
        let errors = catalog().validate_params(ToolName::ReadRange, &json!({"spreadsheet_id": "abc"}));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("range"));
    }

    #[test]
    fn test_validate_params_wrong_type() {
        let errors = catalog().validate_params(
            ToolName::AppendRow,
            &json!({"spreadsheet_id": "abc", "range": "A:C", "values": [1, 2]}),
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("is not of type"));
    }

    #[test]
    fn test_generate_prompt() {
        let prompt = catalog().generate_prompt();
        assert!(prompt.starts_with("Available tools:"));
        assert!(prompt.contains("- get_info(spreadsheet_id: string): Get spreadsheet metadata"));
        assert!(prompt.contains("values: string[][]"));
        assert_eq!(prompt.lines().count(), 6);
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let desc = catalog().get(ToolName::GetInfo).cloned().unwrap();
        let wire = serde_json::to_value(&desc).unwrap();
        assert_eq!(wire["name"], "get_info");
        assert!(wire.get("inputSchema").is_some());
    }
}
