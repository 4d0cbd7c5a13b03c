//! Tool layer: catalog, typed arguments, and the adapter that runs them.
//!
//! The catalog owns tool metadata and schema validation; the adapter maps each
//! decoded call onto exactly one `SheetsBackend` call and renders the outcome
//! as text.

pub mod adapter;
pub mod args;
pub mod catalog;

pub use adapter::{render_error, Content, SheetsToolAdapter, ToolResult};
pub use args::{
    AppendRowArgs, BatchUpdateArgs, GetInfoArgs, RangeUpdate, ReadRangeArgs, ToolCall,
    UpdateRangeArgs,
};
pub use catalog::{ToolCatalog, ToolDescriptor, ToolName};
