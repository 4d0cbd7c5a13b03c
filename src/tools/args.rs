//! Typed tool arguments.
//!
//! Each tool's input schema is generated from these structs, and invocations
//! are decoded into them before any backend call is made.

use crate::tools::catalog::ToolName;
use crate::types::{A1Range, Error, Result, SpreadsheetId};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ReadRangeArgs {
    /// The Google Sheets spreadsheet ID
    pub spreadsheet_id: SpreadsheetId,
    /// The A1 notation range (e.g., 'Sheet1!A1:D10')
    pub range: A1Range,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct UpdateRangeArgs {
    /// The Google Sheets spreadsheet ID
    pub spreadsheet_id: SpreadsheetId,
    /// The A1 notation range (e.g., 'Sheet1!A1:D10')
    pub range: A1Range,
    /// 2D array of values to write
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct AppendRowArgs {
    /// The Google Sheets spreadsheet ID
    pub spreadsheet_id: SpreadsheetId,
    /// The range to append to (e.g., 'Sheet1!A:D')
    pub range: A1Range,
    /// Array of values for the new row
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct GetInfoArgs {
    /// The Google Sheets spreadsheet ID
    pub spreadsheet_id: SpreadsheetId,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct BatchUpdateArgs {
    /// The Google Sheets spreadsheet ID
    pub spreadsheet_id: SpreadsheetId,
    /// Array of range updates
    pub updates: Vec<RangeUpdate>,
}

/// One range of a batch update.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct RangeUpdate {
    /// The A1 notation range to write
    pub range: A1Range,
    /// 2D array of values to write
    pub values: Vec<Vec<String>>,
}

/// A decoded invocation, one variant per tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ReadRange(ReadRangeArgs),
    UpdateRange(UpdateRangeArgs),
    AppendRow(AppendRowArgs),
    GetInfo(GetInfoArgs),
    BatchUpdate(BatchUpdateArgs),
}

impl ToolCall {
    /// Decode `arguments` for `name`.
    pub fn decode(name: ToolName, arguments: Value) -> Result<Self> {
        Ok(match name {
            ToolName::ReadRange => Self::ReadRange(decode_args(name, arguments)?),
            ToolName::UpdateRange => Self::UpdateRange(decode_args(name, arguments)?),
            ToolName::AppendRow => Self::AppendRow(decode_args(name, arguments)?),
            ToolName::GetInfo => Self::GetInfo(decode_args(name, arguments)?),
            ToolName::BatchUpdate => Self::BatchUpdate(decode_args(name, arguments)?),
        })
    }
}

fn decode_args<T: DeserializeOwned>(name: ToolName, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::validation(format!("invalid arguments for {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_read_range() {
        let call = ToolCall::decode(
            ToolName::ReadRange,
            json!({"spreadsheet_id": "abc", "range": "Sheet1!A1:B2"}),
        )
        .unwrap();
        match call {
            ToolCall::ReadRange(args) => {
                assert_eq!(args.spreadsheet_id.as_str(), "abc");
                assert_eq!(args.range.as_str(), "Sheet1!A1:B2");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_argument_is_validation_error() {
        let err = ToolCall::decode(ToolName::ReadRange, json!({"spreadsheet_id": "abc"}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("missing field `range`"));
    }

    #[test]
    fn test_empty_arguments_report_missing_field() {
        let err = ToolCall::decode(ToolName::GetInfo, json!({})).unwrap_err();
        assert!(err.to_string().contains("missing field `spreadsheet_id`"));
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let call = ToolCall::decode(
            ToolName::GetInfo,
            json!({"spreadsheet_id": "abc", "verbose": true}),
        )
        .unwrap();
        let ToolCall::GetInfo(args) = call else {
            panic!("expected get_info");
        };
        assert_eq!(args.spreadsheet_id.as_str(), "abc");
    }

    #[test]
    fn test_decode_batch_update() {
        let call = ToolCall::decode(
            ToolName::BatchUpdate,
            json!({
                "spreadsheet_id": "abc",
                "updates": [
                    {"range": "A1:B1", "values": [["1", "2"]]},
                    {"range": "A2", "values": [["3"]]}
                ]
            }),
        )
        .unwrap();
        let ToolCall::BatchUpdate(args) = call else {
            panic!("expected batch update");
        };
        assert_eq!(args.updates.len(), 2);
        assert_eq!(args.updates[1].values, vec![vec!["3".to_string()]]);
    }

    #[test]
    fn test_one_dimensional_values_rejected_for_update() {
        let err = ToolCall::decode(
            ToolName::UpdateRange,
            json!({"spreadsheet_id": "abc", "range": "A1", "values": ["a", "b"]}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
