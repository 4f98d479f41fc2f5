//! MCP tool implementations

mod extract;

pub use extract::{definition as extract_definition, handle_extract, ExtractParams, TOOL_NAME as EXTRACT_TOOL};
